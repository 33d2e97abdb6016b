//! End-to-end runs against in-memory services

use std::sync::Mutex;

use autoblog::api::{
    BlogApi, GenerationBackend, GenerationRequest, RefreshRequest, TokenEndpoint, TokenGrant,
};
use autoblog::error::{
    AuthError, BackendError, BackendErrorKind, GenerationError, PublishError, TokenError,
};
use autoblog::prompts;
use autoblog::{
    AuthState, BackendCandidate, CredentialManager, Error, GenerationClient, OAuthSecrets,
    Pipeline, PublishClient, PublishRequest, PublishResult,
};

const ARTICLE: &str = "```html
<h1>Ford &amp; the EV Question</h1>
<p>Why value investors keep coming back. #investing #ford</p>
<div id=\"tags\" style=\"display:none\">Ford, EV, #investing, #333</div>
```";

/// Generation backend answering per candidate, recording prompts
struct FakeGemini {
    answers: Vec<(&'static str, Result<&'static str, BackendErrorKind>)>,
    recommended: Option<&'static str>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGemini {
    fn new(answers: Vec<(&'static str, Result<&'static str, BackendErrorKind>)>) -> Self {
        Self {
            answers,
            recommended: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn recommending(mut self, topic: &'static str) -> Self {
        self.recommended = Some(topic);
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl GenerationBackend for FakeGemini {
    async fn generate(
        &self,
        candidate: &BackendCandidate,
        request: &GenerationRequest,
    ) -> Result<String, BackendError> {
        self.prompts
            .lock()
            .unwrap()
            .push((candidate.id().to_string(), request.prompt.clone()));

        if let Some(topic) = self.recommended
            && request.prompt == prompts::recommendation()
        {
            return Ok(topic.to_string());
        }

        let (_, answer) = self
            .answers
            .iter()
            .find(|(id, _)| *id == candidate.id())
            .expect("unscripted candidate");
        answer
            .map(str::to_string)
            .map_err(|kind| BackendError::new(kind, "scripted failure"))
    }
}

struct FakeTokens {
    answer: Result<TokenGrant, TokenError>,
    calls: Mutex<usize>,
}

impl FakeTokens {
    fn granting() -> Self {
        Self {
            answer: Ok(TokenGrant {
                access_token: "ya29.test".to_string(),
                expires_in: Some(3599),
            }),
            calls: Mutex::new(0),
        }
    }

    fn rejecting() -> Self {
        Self {
            answer: Err(TokenError::InvalidGrant(
                "Token has been expired or revoked.".to_string(),
            )),
            calls: Mutex::new(0),
        }
    }
}

impl TokenEndpoint for FakeTokens {
    async fn refresh(&self, _request: &RefreshRequest<'_>) -> Result<TokenGrant, TokenError> {
        *self.calls.lock().unwrap() += 1;
        self.answer.clone()
    }
}

#[derive(Default)]
struct FakeBlogger {
    posts: Mutex<Vec<(String, PublishRequest)>>,
}

impl FakeBlogger {
    fn posts(&self) -> Vec<(String, PublishRequest)> {
        self.posts.lock().unwrap().clone()
    }
}

impl BlogApi for FakeBlogger {
    async fn insert_post(
        &self,
        access_token: &str,
        blog_id: &str,
        request: &PublishRequest,
    ) -> Result<PublishResult, PublishError> {
        assert_eq!(blog_id, "blog-42");
        self.posts
            .lock()
            .unwrap()
            .push((access_token.to_string(), request.clone()));
        Ok(PublishResult {
            id: "9000".to_string(),
            url: None,
        })
    }
}

fn candidates(ids: &[&str]) -> Vec<BackendCandidate> {
    ids.iter().copied().map(BackendCandidate::from).collect()
}

fn credentials(tokens: FakeTokens) -> CredentialManager<FakeTokens> {
    CredentialManager::new(OAuthSecrets::new("id", "secret", "1//refresh"), tokens).unwrap()
}

#[tokio::test]
async fn test_full_run_files_cleaned_draft() {
    let gemini = FakeGemini::new(vec![
        ("gemini-3-flash-preview", Err(BackendErrorKind::RateLimited)),
        ("gemini-2.5-flash", Ok(ARTICLE)),
    ]);
    let generator =
        GenerationClient::new(gemini, candidates(&["gemini-3-flash-preview", "gemini-2.5-flash"]))
            .unwrap();
    let mut creds = credentials(FakeTokens::granting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let report = pipeline.run(Some("Ford (F)")).await.unwrap();

    assert_eq!(report.topic, "Ford (F)");
    assert_eq!(report.candidate.id(), "gemini-2.5-flash");
    assert_eq!(report.title, "Ford & the EV Question");
    assert_eq!(report.tags, vec!["Ford", "EV", "investing", "ford"]);
    assert_eq!(report.post.id, "9000");

    let posts = pipeline.publisher().api().posts();
    assert_eq!(posts.len(), 1);
    let (token, request) = &posts[0];
    assert_eq!(token, "ya29.test");
    assert!(request.is_draft());
    assert!(request.body.starts_with("<h1>"));
    assert!(!request.body.contains("```"));

    let calls = pipeline.generator().backend().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].1.contains("Ford (F)"));

    drop(pipeline);
    assert_eq!(creds.state(), AuthState::Valid);
}

#[tokio::test]
async fn test_missing_topic_uses_recommendation() {
    let gemini = FakeGemini::new(vec![("m", Ok(ARTICLE))]).recommending("\"Tesla (TSLA)\"\n");
    let generator = GenerationClient::new(gemini, candidates(&["m"])).unwrap();
    let mut creds = credentials(FakeTokens::granting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let report = pipeline.run(Some("   ")).await.unwrap();
    assert_eq!(report.topic, "Tesla (TSLA)");

    let calls = pipeline.generator().backend().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].1.contains("Tesla (TSLA)"));
}

#[tokio::test]
async fn test_failed_recommendation_falls_back_to_default_topic() {
    let gemini = FakeGemini::new(vec![("m", Ok(ARTICLE))]).recommending("");
    let generator = GenerationClient::new(gemini, candidates(&["m"]))
        .unwrap()
        .with_default_topic("Apple (AAPL)");
    let mut creds = credentials(FakeTokens::granting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let report = pipeline.run(None).await.unwrap();
    assert_eq!(report.topic, "Apple (AAPL)");
    assert_eq!(report.post.id, "9000");
}

#[tokio::test]
async fn test_invalid_grant_stops_before_publish() {
    let gemini = FakeGemini::new(vec![("m", Ok(ARTICLE))]);
    let generator = GenerationClient::new(gemini, candidates(&["m"])).unwrap();
    let mut creds = credentials(FakeTokens::rejecting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let err = pipeline.run(Some("Ford (F)")).await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidGrant(_))));
    assert!(err.hint().is_some_and(|h| h.contains("REFRESH_TOKEN")));
    assert!(pipeline.publisher().api().posts().is_empty());

    drop(pipeline);
    assert_eq!(creds.state(), AuthState::RefreshFailed);
    assert_eq!(*creds.endpoint().calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_exhaustion_never_touches_credentials() {
    let gemini = FakeGemini::new(vec![
        ("a", Err(BackendErrorKind::RateLimited)),
        ("b", Err(BackendErrorKind::Unavailable)),
        ("c", Ok("  \n")),
    ]);
    let generator = GenerationClient::new(gemini, candidates(&["a", "b", "c"])).unwrap();
    let mut creds = credentials(FakeTokens::granting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let err = pipeline.run(Some("Ford (F)")).await.unwrap_err();

    match err {
        Error::Generation(GenerationError::Exhausted { ref failures }) => {
            assert_eq!(failures.len(), 3);
            assert_eq!(failures[2].1.kind, BackendErrorKind::EmptyResponse);
        }
        ref other => panic!("expected exhaustion, got {other:?}"),
    }
    assert!(err.hint().is_some());
    assert!(pipeline.publisher().api().posts().is_empty());

    drop(pipeline);
    assert_eq!(creds.state(), AuthState::Unvalidated);
    assert_eq!(*creds.endpoint().calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_fatal_generation_error_is_reported() {
    let gemini = FakeGemini::new(vec![
        ("a", Err(BackendErrorKind::Other)),
        ("b", Ok(ARTICLE)),
    ]);
    let generator = GenerationClient::new(gemini, candidates(&["a", "b"])).unwrap();
    let mut creds = credentials(FakeTokens::granting());
    let publisher = PublishClient::new(FakeBlogger::default(), &mut creds, "blog-42");
    let mut pipeline = Pipeline::new(generator, publisher);

    let err = pipeline.run(Some("Ford (F)")).await.unwrap_err();
    assert!(matches!(err, Error::Generation(GenerationError::Fatal { .. })));
    assert_eq!(pipeline.generator().backend().calls().len(), 1);
}

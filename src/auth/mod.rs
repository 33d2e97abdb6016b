//! OAuth credential lifecycle
//!
//! A [`CredentialManager`] is built once per run from externally supplied
//! secrets and is the only thing that mutates the [`Credential`]. Nothing
//! is persisted; every run starts [`AuthState::Unvalidated`].
//!
//! Transitions, all driven by [`CredentialManager::ensure_valid`]:
//!
//! ```text
//! Unvalidated | Expired | Valid(aged out) --refresh ok-------> Valid
//! Unvalidated | Expired | Valid(aged out) --invalid_grant----> RefreshFailed (terminal)
//! Unvalidated | Expired | Valid(aged out) --other failure----> Expired
//! ```

use chrono::{DateTime, Duration, Utc};

use crate::api::{RefreshRequest, TokenEndpoint};
use crate::error::{AuthError, ConfigError, TokenError};

/// Tokens this close to expiry are refreshed early
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Where the credential is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No refresh attempted yet
    Unvalidated,
    /// Access token present (may still age out)
    Valid,
    /// Last refresh failed transiently, or the access token aged out
    Expired,
    /// Refresh token rejected; terminal for this run
    RefreshFailed,
}

/// The three secrets needed for the `refresh_token` grant
#[derive(Clone, Default)]
pub struct OAuthSecrets {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

impl OAuthSecrets {
    /// Bundle the secrets
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Names of the secrets that are empty
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("CLIENT_ID", &self.client_id),
            ("CLIENT_SECRET", &self.client_secret),
            ("REFRESH_TOKEN", &self.refresh_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl std::fmt::Debug for OAuthSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSecrets")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Client secrets plus the current short-lived access token
pub struct Credential {
    secrets: OAuthSecrets,
    access_token: Option<String>,
    valid_until: Option<DateTime<Utc>>,
}

impl Credential {
    fn refresh_request(&self) -> RefreshRequest<'_> {
        RefreshRequest {
            client_id: &self.secrets.client_id,
            client_secret: &self.secrets.client_secret,
            refresh_token: &self.secrets.refresh_token,
        }
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_none()
            || self
                .valid_until
                .is_some_and(|until| now + Duration::seconds(EXPIRY_MARGIN_SECS) >= until)
    }

    fn clear_token(&mut self) {
        self.access_token = None;
        self.valid_until = None;
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secrets", &self.secrets)
            .field("has_access_token", &self.access_token.is_some())
            .field("valid_until", &self.valid_until)
            .finish()
    }
}

/// Owns the credential and hands out a valid access token on demand
pub struct CredentialManager<E> {
    endpoint: E,
    credential: Credential,
    state: AuthState,
    rejection: Option<String>,
}

impl<E: TokenEndpoint> CredentialManager<E> {
    /// Create an unvalidated manager.
    ///
    /// Fails with [`ConfigError::MissingSecrets`] if any secret is empty;
    /// no network call is made here.
    pub fn new(secrets: OAuthSecrets, endpoint: E) -> Result<Self, ConfigError> {
        let missing = secrets.missing();
        if !missing.is_empty() {
            return Err(ConfigError::MissingSecrets(missing));
        }

        Ok(Self {
            endpoint,
            credential: Credential {
                secrets,
                access_token: None,
                valid_until: None,
            },
            state: AuthState::Unvalidated,
            rejection: None,
        })
    }

    /// Current lifecycle state
    pub const fn state(&self) -> AuthState {
        self.state
    }

    /// Expiry of the current access token, if known
    pub const fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.credential.valid_until
    }

    /// The token endpoint in use
    pub const fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Return a usable access token, refreshing first if needed.
    pub async fn ensure_valid(&mut self) -> Result<&str, AuthError> {
        self.ensure_valid_at(Utc::now()).await
    }

    /// [`ensure_valid`](Self::ensure_valid) with an explicit clock.
    pub async fn ensure_valid_at(&mut self, now: DateTime<Utc>) -> Result<&str, AuthError> {
        match self.state {
            AuthState::RefreshFailed => {
                return Err(AuthError::InvalidGrant(
                    self.rejection.clone().unwrap_or_default(),
                ));
            }
            AuthState::Valid if !self.credential.is_expired_at(now) => {}
            AuthState::Valid => {
                tracing::debug!("Access token expired");
                self.state = AuthState::Expired;
                self.refresh(now).await?;
            }
            AuthState::Unvalidated | AuthState::Expired => self.refresh(now).await?,
        }

        self.credential
            .access_token
            .as_deref()
            .ok_or_else(|| AuthError::Refresh("token endpoint returned no access token".to_string()))
    }

    async fn refresh(&mut self, now: DateTime<Utc>) -> Result<(), AuthError> {
        tracing::info!("Refreshing access token");

        let request = self.credential.refresh_request();
        match self.endpoint.refresh(&request).await {
            Ok(grant) => {
                self.credential.access_token = Some(grant.access_token);
                self.credential.valid_until =
                    grant.expires_in.map(|secs| now + Duration::seconds(secs));
                self.state = AuthState::Valid;
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(TokenError::InvalidGrant(description)) => {
                self.credential.clear_token();
                self.state = AuthState::RefreshFailed;
                self.rejection = Some(description.clone());
                tracing::error!("Refresh token rejected (invalid_grant): {description}");
                Err(AuthError::InvalidGrant(description))
            }
            Err(TokenError::Other(message)) => {
                self.credential.clear_token();
                self.state = AuthState::Expired;
                tracing::warn!("Token refresh failed: {message}");
                Err(AuthError::Refresh(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TokenGrant;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Token endpoint that replays scripted answers and counts calls
    struct ScriptedEndpoint {
        answers: Mutex<VecDeque<Result<TokenGrant, TokenError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedEndpoint {
        fn new(answers: Vec<Result<TokenGrant, TokenError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl TokenEndpoint for ScriptedEndpoint {
        async fn refresh(&self, request: &RefreshRequest<'_>) -> Result<TokenGrant, TokenError> {
            assert_eq!(request.refresh_token, "1//refresh");
            *self.calls.lock().unwrap() += 1;
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected refresh call")
        }
    }

    fn grant(token: &str, expires_in: i64) -> Result<TokenGrant, TokenError> {
        Ok(TokenGrant {
            access_token: token.to_string(),
            expires_in: Some(expires_in),
        })
    }

    fn secrets() -> OAuthSecrets {
        OAuthSecrets::new("client", "s3cr3t", "1//refresh")
    }

    fn manager(answers: Vec<Result<TokenGrant, TokenError>>) -> CredentialManager<ScriptedEndpoint> {
        CredentialManager::new(secrets(), ScriptedEndpoint::new(answers)).unwrap()
    }

    #[test]
    fn test_missing_secrets_rejected_before_network() {
        let endpoint = ScriptedEndpoint::new(Vec::new());
        let err = CredentialManager::new(OAuthSecrets::new("client", " ", ""), endpoint)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::MissingSecrets(vec!["CLIENT_SECRET", "REFRESH_TOKEN"])
        );
    }

    #[tokio::test]
    async fn test_first_call_refreshes() {
        let mut manager = manager(vec![grant("ya29.one", 3600)]);
        assert_eq!(manager.state(), AuthState::Unvalidated);

        let token = assert_ok!(manager.ensure_valid().await).to_string();
        assert_eq!(token, "ya29.one");
        assert_eq!(manager.state(), AuthState::Valid);
        assert!(manager.valid_until().is_some());
        assert_eq!(manager.endpoint().calls(), 1);
    }

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let mut manager = manager(vec![grant("ya29.one", 3600)]);
        let now = Utc::now();
        assert_ok!(manager.ensure_valid_at(now).await);
        let token = assert_ok!(manager.ensure_valid_at(now + Duration::minutes(30)).await);
        assert_eq!(token, "ya29.one");
        assert_eq!(manager.endpoint().calls(), 1);
    }

    #[tokio::test]
    async fn test_aged_out_token_is_refreshed() {
        let mut manager = manager(vec![grant("ya29.one", 3600), grant("ya29.two", 3600)]);
        let now = Utc::now();
        assert_ok!(manager.ensure_valid_at(now).await);

        // inside the early-refresh margin
        let later = now + Duration::seconds(3600 - EXPIRY_MARGIN_SECS + 1);
        let token = assert_ok!(manager.ensure_valid_at(later).await);
        assert_eq!(token, "ya29.two");
        assert_eq!(manager.state(), AuthState::Valid);
        assert_eq!(manager.endpoint().calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_grant_is_terminal() {
        let mut manager = manager(vec![Err(TokenError::InvalidGrant(
            "Token has been expired or revoked.".to_string(),
        ))]);

        let err = assert_err!(manager.ensure_valid().await);
        assert_eq!(
            err,
            AuthError::InvalidGrant("Token has been expired or revoked.".to_string())
        );
        assert_eq!(manager.state(), AuthState::RefreshFailed);

        // no second network call
        let again = assert_err!(manager.ensure_valid().await);
        assert!(matches!(again, AuthError::InvalidGrant(_)));
        assert_eq!(manager.endpoint().calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_expired_and_retryable() {
        let mut manager = manager(vec![
            Err(TokenError::Other("connection reset".to_string())),
            grant("ya29.retry", 3600),
        ]);

        let err = assert_err!(manager.ensure_valid().await);
        assert_eq!(err, AuthError::Refresh("connection reset".to_string()));
        assert_eq!(manager.state(), AuthState::Expired);

        let token = assert_ok!(manager.ensure_valid().await);
        assert_eq!(token, "ya29.retry");
        assert_eq!(manager.state(), AuthState::Valid);
    }

    #[tokio::test]
    async fn test_unknown_expiry_stays_valid() {
        let mut manager = manager(vec![Ok(TokenGrant {
            access_token: "ya29.forever".to_string(),
            expires_in: None,
        })]);
        let now = Utc::now();
        assert_ok!(manager.ensure_valid_at(now).await);
        assert_ok!(manager.ensure_valid_at(now + Duration::days(1)).await);
        assert_eq!(manager.endpoint().calls(), 1);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let shown = format!("{:?}", manager(Vec::new()).credential);
        assert!(!shown.contains("s3cr3t"));
        assert!(!shown.contains("1//refresh"));
        assert!(shown.contains("client"));
    }
}

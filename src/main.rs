//! Autoblog - generate an article and file it as a Blogger draft
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use autoblog::api::{BloggerClient, GeminiClient, GoogleTokenEndpoint};
use autoblog::{Config, CredentialManager, GenerationClient, Pipeline, PublishClient, Secrets};

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG=info for stage-by-stage output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match parse_args() {
        Ok(Command::Run { topic }) => run_pipeline(topic.as_deref()).await,
        Ok(Command::Models) => list_models().await,
        Ok(Command::CheckAuth) => check_auth().await,
        Ok(Command::Help) => {
            print_help();
            Ok(())
        }
        Ok(Command::Version) => {
            print_version();
            Ok(())
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(hint) = e.downcast_ref::<autoblog::Error>().and_then(autoblog::Error::hint) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}

/// CLI commands
enum Command {
    Run { topic: Option<String> },
    Models,
    CheckAuth,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(first) = args.first() else {
        return Ok(Command::Run { topic: None });
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "models" => Ok(Command::Models),
        "check-auth" => Ok(Command::CheckAuth),

        other if other.starts_with('-') => Err(anyhow::anyhow!(
            "Unknown option: {other}\nRun 'autoblog --help' for usage"
        )),

        // Unquoted multi-word topics are joined back together
        _ => Ok(Command::Run {
            topic: Some(args.join(" ")),
        }),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"autoblog {} - generate an article and file it as a Blogger draft

USAGE:
    autoblog [TOPIC]                   Generate and file one draft
                                       (a topic is recommended when omitted)
    autoblog [COMMAND]

COMMANDS:
    models                             List models visible to the API key
    check-auth                         Refresh the OAuth token once and report

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

ENVIRONMENT:
    GEMINI_API_KEY   (or GOOGLE_API_KEY)
    CLIENT_ID        (or BLOGGER_CLIENT_ID)
    CLIENT_SECRET    (or BLOGGER_CLIENT_SECRET)
    REFRESH_TOKEN    (or BLOGGER_REFRESH_TOKEN)
    BLOG_ID          (or BLOGGER_BLOG_ID)
    AUTOBLOG_CONFIG  Config file path override
    RUST_LOG         Log filter (e.g. info, autoblog=debug)

CONFIG:
    {}
"#,
        autoblog::VERSION,
        config_path
    );
}

fn print_version() {
    println!("autoblog {}", autoblog::VERSION);
}

async fn run_pipeline(topic: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    // Every secret is checked before the first network call
    let secrets = Secrets::from_env()
        .require_all()
        .map_err(autoblog::Error::from)?;

    let generator = GenerationClient::new(
        GeminiClient::with_base(&config.gemini_api_base, &secrets.gemini_api_key),
        config.candidates.clone(),
    )
    .map_err(autoblog::Error::from)?
    .with_params(config.generation_params())
    .with_default_topic(&config.default_topic);

    let mut credentials = CredentialManager::new(
        secrets.oauth,
        GoogleTokenEndpoint::with_url(&config.token_endpoint),
    )
    .map_err(autoblog::Error::from)?;
    let publisher = PublishClient::new(
        BloggerClient::with_base(&config.blogger_api_base),
        &mut credentials,
        secrets.blog_id,
    );

    let report = Pipeline::new(generator, publisher).run(topic).await?;

    println!("✓ Draft created: {}", report.title);
    println!("  Topic:  {}", report.topic);
    println!("  Model:  {}", report.candidate);
    println!("  Post:   {}", report.post.id);
    if let Some(url) = &report.post.url {
        println!("  URL:    {url} (live once published)");
    }
    if !report.tags.is_empty() {
        println!("  Labels: {}", report.tags.join(", "));
    }
    println!("\nReview the draft in Blogger before publishing.");

    Ok(())
}

async fn list_models() -> Result<()> {
    let config = Config::load()?;
    let secrets = Secrets::from_env();
    let api_key = secrets.gemini_api_key().map_err(autoblog::Error::from)?;

    let client = GeminiClient::with_base(&config.gemini_api_base, api_key);
    let models = client.list_models().await?;

    println!("Models visible to this key (* = configured candidate):\n");
    for model in &models {
        let marker = if config.candidates.iter().any(|c| c.id() == model.id()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<40} {}",
            model.id(),
            model.supported_generation_methods.join(", ")
        );
    }

    let usable = models.iter().filter(|m| m.can_generate()).count();
    println!("\n{} models, {} support generateContent", models.len(), usable);

    Ok(())
}

async fn check_auth() -> Result<()> {
    let config = Config::load()?;
    let secrets = Secrets::from_env().oauth().map_err(autoblog::Error::from)?;

    let mut credentials = CredentialManager::new(
        secrets,
        GoogleTokenEndpoint::with_url(&config.token_endpoint),
    )
    .map_err(autoblog::Error::from)?;

    credentials
        .ensure_valid()
        .await
        .map_err(autoblog::Error::from)?;

    println!("✓ Refresh token accepted");
    if let Some(until) = credentials.valid_until() {
        println!("  Access token valid until {}", until.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

//! EduBot tutoring chat server.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use edubot_llm::OpenAiClient;
use edubot_server::state::load_lexicon;
use edubot_server::{http, session, AppState, Config};

/// Empathetic tutoring chat server.
#[derive(Parser, Debug)]
#[command(name = "edubot-server", about = "Empathetic tutoring chat server")]
struct Args {
    /// HTTP server address
    #[arg(long, env = "EDUBOT_HTTP_ADDR", default_value = "127.0.0.1:5000")]
    http_addr: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai-proxy.org/v1")]
    api_base: String,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Model used for completions
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value = "0.7")]
    temperature: f32,

    /// Path to the negative-word lexicon
    #[arg(long, default_value = "negative_words.txt")]
    lexicon: String,

    /// Idle seconds before a session is dropped
    #[arg(long, default_value = "3600")]
    session_ttl_secs: u64,

    /// Seconds between idle-session sweeps
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_secs: u64,

    /// Upstream connect and idle timeout in seconds
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    upstream_timeout_secs: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            http_addr: args.http_addr,
            api_base: args.api_base,
            api_key: args.api_key,
            model: args.model,
            temperature: args.temperature,
            lexicon_path: args.lexicon,
            session_ttl_secs: args.session_ttl_secs,
            sweep_interval_secs: args.sweep_interval_secs,
            upstream_timeout_secs: args.upstream_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config: Config = Args::parse().into();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("edubot=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()?;

    let http_addr: SocketAddr = config.http_addr.parse()?;

    if config.api_key.is_empty() {
        warn!("OPENAI_API_KEY is empty, upstream requests are sent without credentials");
    }

    let lexicon = load_lexicon(&config.lexicon_path);
    let completion = Arc::new(
        OpenAiClient::new(&config.api_base, &config.api_key)
            .with_timeout(config.upstream_timeout()),
    );

    info!(
        http_addr = %http_addr,
        api_base = %config.api_base,
        model = %config.model,
        lexicon_words = lexicon.len(),
        "Starting EduBot server"
    );

    let state = AppState::new(config, lexicon, completion);
    let shutdown = CancellationToken::new();

    let sweeper = tokio::spawn(session::run_sweeper(state.clone(), shutdown.clone()));

    let router = http::create_router(state);
    let listener = TcpListener::bind(http_addr).await?;
    info!("HTTP server listening on {}", http_addr);

    let signal = shutdown.clone();
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await;

    shutdown.cancel();
    let _ = sweeper.await;

    if let Err(e) = served {
        error!(error = %e, "HTTP server error");
        return Err(e.into());
    }

    info!("EduBot server stopped");
    Ok(())
}

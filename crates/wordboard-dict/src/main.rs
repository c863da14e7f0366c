use anyhow::Context;
use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordboard_core::trie::PrefixDictionary;

mod api;

#[derive(Debug, Parser)]
#[command(
    name = "wordboard-dict",
    version,
    about = "Prefix dictionary service backing the word oracle"
)]
struct Cli {
    /// Where the HTTP API will listen, e.g. 127.0.0.1:8000
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Word list file, one word per line.
    #[arg(long, default_value = "etc/wordlist.txt")]
    wordlist: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let contents = std::fs::read_to_string(&cli.wordlist)
        .with_context(|| format!("reading word list {}", cli.wordlist.display()))?;
    let dict = PrefixDictionary::from_words(
        contents
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty()),
    );
    info!(
        "dictionary loaded: words={} nodes={} approx_memory={} bytes",
        dict.word_count(),
        dict.node_count(),
        dict.approx_memory_bytes()
    );

    let state = api::AppState {
        dict: Arc::new(dict),
    };

    let app = Router::new()
        .route("/healthcheck", get(api::healthcheck))
        .route("/isword/{word}", get(api::is_word))
        .route("/startswith/{prefix}", get(api::words_with_prefix))
        .route("/firstword/{prefix}", get(api::first_word))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = cli.listen.parse()?;
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}

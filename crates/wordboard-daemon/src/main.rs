use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordboard_daemon::{api, config::DaemonConfig, db::Db};

#[derive(Debug, Parser)]
#[command(
    name = "wordboard-daemon",
    version,
    about = "Blackboard store for the word search agents"
)]
struct Cli {
    /// Where the HTTP API will listen, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// SurrealKV directory for embedded SurrealDB.
    #[arg(long, default_value = ".wordboard/db")]
    db_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = DaemonConfig {
        listen: cli.listen.clone(),
        db_dir: cli.db_dir,
    };

    info!("starting daemon with config: {:?}", config);

    let db = Db::connect(&config).await?;
    let addr: SocketAddr = config.listen.parse()?;

    let app = api::router(api::AppState::new(db))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

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

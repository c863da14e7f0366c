use clap::Parser;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordboard_agents::client::StoreClient;
use wordboard_agents::watcher::run_watcher_tick;

#[derive(Debug, Parser)]
#[command(
    name = "wordboard-watcher",
    version,
    about = "Advances task status by observing workitem progress"
)]
struct Cli {
    /// Blackboard store base URL.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    store_url: String,

    /// Tick cadence in seconds.
    #[arg(long, default_value_t = 60)]
    poll_interval_seconds: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = StoreClient::new(&cli.store_url);
    info!("watcher starting; store={}", cli.store_url);

    let mut tick = interval(Duration::from_secs(cli.poll_interval_seconds));
    loop {
        tick.tick().await;
        if let Err(e) = run_watcher_tick(&store).await {
            warn!("watcher tick error: {e}");
        }
    }
}

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wordboard_agents::client::{OracleClient, StoreClient};
use wordboard_agents::consumer::run_consumer_once;
use wordboard_core::subsequence::DEFAULT_MAX_INPUT_LEN;

#[derive(Debug, Parser)]
#[command(
    name = "wordboard-consumer",
    version,
    about = "Drains one NEW workitem, discovering dictionary words"
)]
struct Cli {
    /// Blackboard store base URL.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    store_url: String,

    /// Dictionary service base URL.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    oracle_url: String,

    /// Enumeration ceiling; longer inputs fail the invocation.
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_LEN)]
    max_input_length: usize,
}

/// Single-shot invocation: process at most one workitem and exit. Any
/// unrecoverable failure exits non-zero, leaving the workitem RUNNING for
/// a later re-run.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = StoreClient::new(&cli.store_url);
    let oracle = OracleClient::new(&cli.oracle_url);

    match run_consumer_once(&store, &oracle, cli.max_input_length).await {
        Ok(None) => info!("no new workitems"),
        Ok(Some(report)) => info!(
            "workitem {} completed with {} words for task {}",
            report.workitem_id, report.words_found, report.task_id
        ),
        Err(e) => {
            error!("consumer invocation failed: {e}");
            std::process::exit(1);
        }
    }
}

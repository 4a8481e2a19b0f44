use clap::Parser;
use dotenvy::dotenv;

use gradeline::cli::{self, Cli};
use gradeline::state::init_app_state;
use gradeline_observability::{export_metrics, init_logging, init_metrics};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    init_metrics();

    let cli = Cli::parse();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to start: {:#}", e);
            export_metrics();
            std::process::exit(1);
        }
    };

    cli::run(&state, cli.command).await;
    export_metrics();
}

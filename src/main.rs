mod backup;
mod cli;
mod config;
mod database;
mod error;
mod log;
mod process;
mod workflow;

use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    log::init(cli.args().verbose());

    let started_at = Local::now();
    info!("Started at {}", started_at.format("%Y-%m-%d %H:%M:%S"));

    let outcome = cli::run(&cli, started_at.naive_local()).await;

    let ended_at = Local::now();
    info!("Ended at {}", ended_at.format("%Y-%m-%d %H:%M:%S"));
    info!(
        "Total time: {:.3}s",
        (ended_at - started_at).num_milliseconds() as f64 / 1000.0
    );

    match outcome {
        Ok(report) => {
            if let Some(failure) = &report.restore_failure {
                warn!(
                    "Restore tool reported a failure ({}); check the target database",
                    failure
                );
            }
            info!("Finished: {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

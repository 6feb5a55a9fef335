mod client;
mod copy;
mod error;
mod utils;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use crate::copy::RunReport;

/// Copy a DynamoDB table (schema and items) into a newly created table.
#[derive(Parser, Debug)]
#[command(name = "dynamo-copy", version)]
struct Cli {
    /// Table to copy from
    source_table: String,
    /// Table to create and copy into
    destination_table: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    utils::init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1 for this tool, not clap's default 2;
            // --help and --version still exit 0.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = utils::Config::from_env();
    let client = client::build_client(&config).await;

    info!(
        source = %cli.source_table,
        destination = %cli.destination_table,
        region = %config.region,
        local = config.use_local,
        "starting table copy"
    );

    match copy::run(&client, &config, &cli.source_table, &cli.destination_table).await {
        Ok(RunReport::DestinationExists) => ExitCode::SUCCESS,
        Ok(RunReport::Completed(summary)) => {
            info!(
                copied = summary.copied,
                workers = summary.workers,
                failed_workers = summary.failed_workers,
                "all jobs done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run aborted");
            ExitCode::from(err.exit_code())
        }
    }
}

// cellar-cli: call the cellar API from the command line

mod cli;
mod logging;
mod settings;

use std::process::ExitCode;

use cellar_client::{CellarClient, CellarError};
use clap::Parser;
use tracing::debug;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = settings::load(&cli.connection_overrides(), None)?;
    debug!("Using cellar API at {}", config.url_prefix());

    let request = cli.command.into_request()?;
    let client = CellarClient::new(config)?;

    match client
        .call(
            request.action,
            &request.path,
            request.payload,
            request.years,
            request.overrides,
        )
        .await
    {
        Ok(response) => {
            println!("{}", response.status);
            if !response.body.is_null() {
                println!("{}", serde_json::to_string_pretty(&response.body)?);
            }
            Ok(())
        }
        Err(CellarError::Status { status, body }) => {
            println!("{}", status);
            if !body.is_null() {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            anyhow::bail!("{} failed with status {}", request.action, status)
        }
        Err(e) => Err(e.into()),
    }
}

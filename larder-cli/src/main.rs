//! Larder CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use larder_cli::cli::Cli;
use larder_cli::commands::Larder;
use larder_cli::config::LarderConfig;
use larder_cli::error::CliError;
use larder_cli::telemetry;
use larder_source::MealDbClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = LarderConfig::load(cli.config.as_deref())?;
    telemetry::init_tracing(&config)?;

    let source = MealDbClient::with_base_url(config.api_base_url.clone(), config.request_timeout())?;
    let app = Larder::new(Arc::new(source), &config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app.run(cli.command, &mut out).await
}

use std::process::ExitCode;

use clap::Parser;
use cleaning_cli::{ApiClient, App, Cli, IdentityStore};
use modkit::TracedClient;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let identity = IdentityStore::new(
        cli.identity_file
            .clone()
            .unwrap_or_else(IdentityStore::default_path),
    );
    let http = match reqwest::Client::builder()
        .user_agent(concat!("cleaning-cli/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(c) => TracedClient::new(c),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let api = match ApiClient::new(http, &cli.api_url) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(api, identity, std::io::stdout().lock());
    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use todo_server::{config, logging, Config};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = config::load_env_file(Path::new(".env")) {
        eprintln!("failed to read .env: {err}");
        return ExitCode::FAILURE;
    }
    // Missing or invalid configuration exits here with clap's usage error.
    let config = Config::parse();
    logging::init(&config);

    match todo_server::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server failed to start");
            ExitCode::FAILURE
        }
    }
}

// ABOUTME: Entry point for the netlify-upload CLI application.
// ABOUTME: Sets up tracing and signal handling, then runs the deploy command.

mod cli;
mod commands;
mod signal;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use netlify_upload::output::Output;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting netlify-upload");

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if signal::watch(token, wait_for_signal).await {
            std::process::exit(signal::FORCED_EXIT_CODE);
        }
    });

    let mut output = Output::new(cli.output);
    match commands::deploy(cli.config.as_deref(), &mut output, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                output.error(&e.to_string());
            }
            ExitCode::FAILURE
        }
    }
}

/// Wait for ctrl-c or SIGTERM. False if no handler could be installed.
#[cfg(unix)]
async fn wait_for_signal() -> bool {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "could not install SIGTERM handler");
            return tokio::signal::ctrl_c().await.is_ok();
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.is_ok(),
        received = terminate.recv() => received.is_some(),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}

//! `typewriter` - looping typewriter effect for terminals and files

use std::sync::atomic::{AtomicI32, Ordering};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use typewriter::cli::args::{Cli, OutputFormat};
use typewriter::cli::commands;
use typewriter::error::ExitCode;
use typewriter::observability::{LogFormat, init_logging};

/// Exit code of the first signal received, or 0.
static SIGNAL_EXIT: AtomicI32 = AtomicI32::new(ExitCode::SUCCESS);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let format = match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();

    // First signal stops the engines; a second one exits immediately.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to register SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    SIGNAL_EXIT.store(ExitCode::INTERRUPTED, Ordering::SeqCst);
                    signal_cancel.cancel();
                    return;
                }
            };

        let code = tokio::select! {
            _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
            _ = sigterm.recv() => ExitCode::TERMINATED,
        };
        SIGNAL_EXIT.store(code, Ordering::SeqCst);
        signal_cancel.cancel();

        eprintln!("\nStopping... (press Ctrl+C again to force)");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(SIGNAL_EXIT.load(Ordering::SeqCst)),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jarvis::cli::commands::{
    handle_ask, handle_config, handle_ingest, handle_serve, handle_status,
};
use jarvis::cli::output::get_formatter;
use jarvis::cli::{Cli, Commands};
use jarvis::models::{Config, OutputFormat};

/// Detect ONNX Runtime library path and set ORT_DYLIB_PATH if not already set.
/// Must be called before any ort code runs.
fn detect_and_set_ort_path() {
    if std::env::var("ORT_DYLIB_PATH")
        .map(|p| Path::new(&p).exists())
        .unwrap_or(false)
    {
        return;
    }

    let home = std::env::var("HOME").unwrap_or_default();

    let found = if cfg!(target_os = "macos") {
        [
            format!("{home}/.local/lib/jarvis/libonnxruntime.dylib"),
            "/opt/homebrew/opt/onnxruntime/lib/libonnxruntime.dylib".into(),
            "/usr/local/opt/onnxruntime/lib/libonnxruntime.dylib".into(),
        ]
        .into_iter()
        .find(|p| Path::new(p).exists())
    } else if cfg!(target_os = "linux") {
        [
            format!("{home}/.local/lib/jarvis/libonnxruntime.so"),
            "/usr/lib/libonnxruntime.so".into(),
            "/usr/local/lib/libonnxruntime.so".into(),
            "/usr/lib/x86_64-linux-gnu/libonnxruntime.so".into(),
            "/usr/lib/aarch64-linux-gnu/libonnxruntime.so".into(),
        ]
        .into_iter()
        .find(|p| Path::new(p).exists())
    } else {
        None
    };

    if let Some(path) = found {
        // SAFETY: called during startup before the model is loaded or any
        // task reads the environment.
        unsafe {
            std::env::set_var("ORT_DYLIB_PATH", path);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "jarvis=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    detect_and_set_ort_path();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = cli.format;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", get_formatter(format).format_error(&format!("{e:#}")).trim_end());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    run_command(cli.command, config, cli.format, cli.verbose).await
}

async fn run_command(
    command: Commands,
    config: Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    match command {
        Commands::Serve(args) => {
            handle_serve(args, config, shutdown_signal()).await?;
        }
        Commands::Ingest(args) => {
            until_interrupted(handle_ingest(args, config, format, verbose), shutdown_signal())
                .await?;
        }
        Commands::Ask(args) => {
            handle_ask(args, config, format, verbose).await?;
        }
        Commands::Status => {
            handle_status(config, format, verbose).await?;
        }
        Commands::Config(cmd) => {
            handle_config(cmd, config, format).await?;
        }
    }

    Ok(())
}

/// An ingest cut short by `interrupt` may have written only some batches,
/// so the interruption is reported as a failure.
async fn until_interrupted(
    task: impl Future<Output = Result<()>>,
    interrupt: impl Future<Output = ()>,
) -> Result<()> {
    tokio::select! {
        result = task => result,
        _ = interrupt => anyhow::bail!("ingestion interrupted; earlier batches may already be written"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

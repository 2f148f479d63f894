//! chatrelay CLI and HTTP API entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, loads configuration, then either mints an API key
//! or starts the HTTP server.

mod cli;
mod http;
mod state;

use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::generate;

use chatrelay_infra::config::{CONFIG_FILE, load_config, resolve_data_dir};
use chatrelay_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};

use cli::{Cli, Commands, KeyAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatrelay", &mut std::io::stdout());
        return Ok(());
    }

    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    init_tracing(verbosity_filter(cli.verbose, cli.quiet), enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE));

    let result = match cli.command {
        Commands::Key {
            action: KeyAction::Create { user_id, name },
        } => {
            tokio::fs::create_dir_all(&data_dir).await?;
            cli::key::create_key(&data_dir, &user_id, &name).await
        }
        Commands::Serve { port, host, .. } => serve(&data_dir, &config_path, host, port).await,
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}

async fn serve(
    data_dir: &Path,
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path).await?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let state = AppState::init(data_dir, &config, &config_dir).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %data_dir.display(), "server listening");

    println!(
        "  {} chatrelay listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod podcast_cmd;

use args::{Args, Command, ServeArgs};
use clap::Parser;
use stockast_config::Config;
use stockast_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Podcast(podcast)) => {
            let _telemetry_guard = stockast_telemetry::init(None, "warn")?;
            podcast_cmd::run(podcast).await
        }
        Some(Command::Serve(serve)) => serve_gateway(&args.config, serve).await,
        None => serve_gateway(&args.config, ServeArgs::default()).await,
    }
}

async fn serve_gateway(config_path: &std::path::Path, args: ServeArgs) -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load(config_path)?;

    // Initialize telemetry
    let _telemetry_guard = stockast_telemetry::init(config.telemetry.as_ref(), "info")?;

    tracing::info!(
        config_path = %config_path.display(),
        "starting stockast"
    );

    // Build server
    let mut server = Server::new(&config)?;
    if let Some(listen) = args.listen {
        server = server.with_listen_address(listen);
    }

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    // Run server
    server.serve(shutdown).await?;

    tracing::info!("stockast stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}

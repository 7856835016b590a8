//! Main entry point for the cloudflare-logs-downloader CLI

use clap::Parser;
use cloudflare_logs_downloader::cli::Cli;
use cloudflare_logs_downloader::logging::{init_tracing, LogFormat};
use cloudflare_logs_downloader::shutdown::{SharedShutdown, ShutdownCoordinator};
use tracing::error;

async fn run(cli: Cli, shutdown: SharedShutdown) -> anyhow::Result<()> {
    cli.execute(shutdown).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing(LogFormat::from_env()) {
        eprintln!("failed to initialise logging: {e}");
    }

    let cli = Cli::parse();

    // Ctrl+C stops the run before the next commit; the checkpoint stays valid
    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - stopping after the last committed window");
                shutdown.request_shutdown();
            }
        }
    });

    // The only place errors are reported
    if let Err(e) = run(cli, shutdown).await {
        error!("{e}");
        std::process::exit(1);
    }
}

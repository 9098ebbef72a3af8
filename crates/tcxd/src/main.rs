//! tcxd — the TeamCity exporter daemon.
//!
//! Single binary that assembles the exporter:
//! - Configuration load + validation (fatal on error)
//! - One scrape scheduler and one prober per configured instance
//! - Shared metric store
//! - Landing page + Prometheus exposition endpoint
//!
//! # Usage
//!
//! ```text
//! tcxd --config config.toml --listen-address 0.0.0.0:9107
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use tcx_core::Configuration;
use tcx_gateway::{BuildServerGateway, TeamCityClient};
use tcx_metrics::MetricStore;
use tcx_scraper::{run_instance, run_prober};

#[derive(Parser)]
#[command(name = "tcxd", about = "TeamCity build metrics exporter")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Address to listen on for the web interface and telemetry.
    #[arg(long, default_value = "0.0.0.0:9107")]
    listen_address: SocketAddr,

    /// Path under which to expose metrics.
    #[arg(long, default_value = "/metrics")]
    telemetry_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tcxd=debug,tcx=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let config = Configuration::from_file(&cli.config)
        .context("failed to parse configuration file")?;
    config.validate().context("failed to validate configuration")?;
    info!(
        instances = config.instances.len(),
        path = ?cli.config,
        "configuration loaded"
    );

    let store = MetricStore::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    for instance in &config.instances {
        let instance = Arc::new(instance.clone());
        let gateway: Arc<dyn BuildServerGateway> = Arc::new(
            TeamCityClient::new(&instance.url, &instance.username, &instance.password)
                .with_context(|| format!("failed to build client for '{}'", instance.name))?,
        );

        tokio::spawn(run_instance(
            instance.clone(),
            gateway.clone(),
            store.clone(),
            shutdown_rx.clone(),
        ));
        tokio::spawn(run_prober(
            instance,
            gateway,
            store.clone(),
            shutdown_rx.clone(),
        ));
    }

    let router = tcx_web::build_router(store, &cli.telemetry_path);
    info!(addr = %cli.listen_address, "exposition server starting");

    let listener = tokio::net::TcpListener::bind(cli.listen_address).await?;

    // Graceful shutdown on Ctrl-C; schedulers and probers stop via the
    // watch channel.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    info!("exporter stopped");
    Ok(())
}

//! Per-instance scrape scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use tcx_core::InstanceConfig;
use tcx_gateway::BuildServerGateway;
use tcx_metrics::MetricStore;

use crate::pipeline::run_scrape;

/// Drive periodic scrapes for one instance until shutdown.
///
/// Ticks are measured tick to tick, and the first fires immediately. Each
/// tick launches [`run_scrape`] as a detached task: a slow scrape does not
/// delay the next tick, so two runs for the same instance may overlap.
/// That is a deliberate policy — overlapping runs race only on the metric
/// store, where every write is a whole-entry replacement and the last one
/// wins.
pub async fn run_instance(
    instance: Arc<InstanceConfig>,
    gateway: Arc<dyn BuildServerGateway>,
    store: MetricStore,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(instance.scrape_interval));
    info!(
        instance = %instance.name,
        interval_secs = instance.scrape_interval,
        "scrape scheduler started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let instance = instance.clone();
                let gateway = gateway.clone();
                let store = store.clone();
                tokio::spawn(run_scrape(instance, gateway, store));
            }
            _ = shutdown.changed() => {
                info!(instance = %instance.name, "scrape scheduler shutting down");
                break;
            }
        }
    }
}

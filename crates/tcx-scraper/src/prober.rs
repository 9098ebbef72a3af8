//! Instance reachability probing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use tcx_core::InstanceConfig;
use tcx_gateway::{BuildServerGateway, GatewayError};
use tcx_metrics::naming::INSTANCE_STATUS;
use tcx_metrics::{Label, MetricStore, Sample};

/// Probe the instance once and record the status gauge.
///
/// The gauge reads 1 when the server answered and accepted the
/// credentials, 0 on any transport failure or an HTTP 401. The two
/// failure modes are distinguished in logs only. Returns the recorded
/// status.
pub async fn probe_instance(
    instance: &InstanceConfig,
    gateway: &dyn BuildServerGateway,
    store: &MetricStore,
) -> bool {
    let up = match gateway.probe().await {
        Ok(()) => true,
        Err(GatewayError::Unauthorized { .. }) => {
            warn!(instance = %instance.name, "instance rejected credentials");
            false
        }
        Err(err) => {
            warn!(instance = %instance.name, error = %err, "instance unreachable");
            false
        }
    };

    store
        .set(Sample::new(
            INSTANCE_STATUS,
            vec![Label::new("instance", &instance.name)],
            if up { 1.0 } else { 0.0 },
        ))
        .await;
    up
}

/// Re-probe the instance on its scrape interval until shutdown.
///
/// Runs independently of the scrape scheduler; a hung scrape never stops
/// the status gauge from updating.
pub async fn run_prober(
    instance: Arc<InstanceConfig>,
    gateway: Arc<dyn BuildServerGateway>,
    store: MetricStore,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(instance.scrape_interval));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                probe_instance(&instance, gateway.as_ref(), &store).await;
            }
            _ = shutdown.changed() => {
                info!(instance = %instance.name, "prober shutting down");
                break;
            }
        }
    }
}

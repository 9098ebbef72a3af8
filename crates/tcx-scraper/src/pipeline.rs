//! The four-stage scrape pipeline.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

use tcx_core::InstanceConfig;
use tcx_gateway::BuildServerGateway;
use tcx_metrics::naming::{INSTANCE_LAST_SCRAPE_DURATION, INSTANCE_LAST_SCRAPE_FINISH_TIME};
use tcx_metrics::{metric_name, Label, MetricStore, Sample};

use crate::expander::expand_filters;
use crate::types::{BuildFilter, BuildStatistics, FilteredBuild};

/// Buffer size of the inter-stage channels. Sends block once a stage gets
/// this far ahead of its consumer.
const CHANNEL_CAPACITY: usize = 64;

/// One complete scrape of one instance.
///
/// Expands filters, fetches builds and their statistics, and publishes
/// gauges into the store. Always runs to completion: failures are logged
/// and dropped at the item that caused them, and the run finishes once
/// every spawned item task has. On completion the per-instance
/// last-scrape-finish-time and last-scrape-duration gauges are updated.
pub async fn run_scrape(
    instance: Arc<InstanceConfig>,
    gateway: Arc<dyn BuildServerGateway>,
    store: MetricStore,
) {
    let started = Instant::now();
    debug!(instance = %instance.name, "scrape started");

    let (filter_tx, filter_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (build_tx, build_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (stat_tx, stat_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let expander = tokio::spawn({
        let gateway = gateway.clone();
        let instance = instance.clone();
        async move { expand_filters(gateway, &instance, filter_tx).await }
    });
    let builds = tokio::spawn(fetch_builds(gateway.clone(), filter_rx, build_tx));
    let statistics = tokio::spawn(fetch_statistics(gateway, build_rx, stat_tx));
    let parser = tokio::spawn(parse_statistics(store.clone(), stat_rx));

    let _ = tokio::join!(expander, builds, statistics, parser);

    let instance_label = vec![Label::new("instance", &instance.name)];
    store
        .set(Sample::new(
            INSTANCE_LAST_SCRAPE_FINISH_TIME,
            instance_label.clone(),
            epoch_secs() as f64,
        ))
        .await;
    store
        .set(Sample::new(
            INSTANCE_LAST_SCRAPE_DURATION,
            instance_label,
            started.elapsed().as_secs_f64(),
        ))
        .await;

    debug!(
        instance = %instance.name,
        duration_ms = started.elapsed().as_millis() as u64,
        "scrape finished"
    );
}

/// Stage 2: query builds for every expanded filter, one task per filter.
///
/// The output channel closes only after every in-flight query has joined.
/// Emission order across filters is whatever the queries' completion
/// order happens to be.
pub async fn fetch_builds(
    gateway: Arc<dyn BuildServerGateway>,
    mut rx: mpsc::Receiver<BuildFilter>,
    tx: mpsc::Sender<FilteredBuild>,
) {
    let mut tasks = JoinSet::new();
    while let Some(filter) = rx.recv().await {
        let gateway = gateway.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            match gateway.query_builds(&filter.locator).await {
                Ok(builds) => {
                    for details in builds {
                        let item = FilteredBuild {
                            details,
                            filter: filter.clone(),
                        };
                        if tx.send(item).await.is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    error!(filter = %filter.name, error = %err, "failed to query builds by filter");
                }
            }
        });
    }
    drop(tx);
    while tasks.join_next().await.is_some() {}
}

/// Stage 3: query statistics for every build, one task per build.
pub async fn fetch_statistics(
    gateway: Arc<dyn BuildServerGateway>,
    mut rx: mpsc::Receiver<FilteredBuild>,
    tx: mpsc::Sender<BuildStatistics>,
) {
    let mut tasks = JoinSet::new();
    while let Some(build) = rx.recv().await {
        let gateway = gateway.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            match gateway.build_statistics(build.details.id).await {
                Ok(properties) => {
                    let _ = tx.send(BuildStatistics { build, properties }).await;
                }
                Err(err) => {
                    error!(
                        build = %build.details.web_url,
                        error = %err,
                        "failed to query build statistics"
                    );
                }
            }
        });
    }
    drop(tx);
    while tasks.join_next().await.is_some() {}
}

/// Stage 4: convert statistics into samples and write them to the store.
pub async fn parse_statistics(store: MetricStore, mut rx: mpsc::Receiver<BuildStatistics>) {
    while let Some(statistics) = rx.recv().await {
        for sample in statistics_samples(&statistics) {
            store.set(sample).await;
        }
    }
}

/// Convert one build's statistics into labeled samples.
///
/// A property value that does not parse as a float is skipped; its
/// siblings are still processed. A property name of the form `base:rest`
/// becomes the metric for `base` with the remainder attached as an
/// `other` label, which is how sub-metrics sharing one base name stay
/// distinguishable.
pub fn statistics_samples(statistics: &BuildStatistics) -> Vec<Sample> {
    let build = &statistics.build;
    let mut samples = Vec::with_capacity(statistics.properties.len());

    for property in &statistics.properties {
        let value: f64 = match property.value.parse() {
            Ok(value) => value,
            Err(err) => {
                error!(
                    property = %property.name,
                    value = %property.value,
                    error = %err,
                    "failed to parse statistic value as float"
                );
                continue;
            }
        };

        let mut parts = property.name.splitn(2, ':');
        let base = parts.next().unwrap_or("");
        let remainder = parts.next();

        let mut labels = vec![
            Label::new("exporter_instance", &build.filter.instance),
            Label::new("exporter_filter", &build.filter.name),
            Label::new("build_configuration", &build.details.build_type_id),
            Label::new("branch", &build.details.branch_name),
        ];
        if let Some(remainder) = remainder {
            labels.push(Label::new("other", remainder));
        }

        samples.push(Sample::new(metric_name(base), labels, value));
    }
    samples
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

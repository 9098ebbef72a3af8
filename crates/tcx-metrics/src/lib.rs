//! tcx-metrics — the shared gauge store and Prometheus exposition.
//!
//! Scrape pipelines write [`Sample`]s keyed by a deterministic identity
//! hash; the web layer renders a point-in-time snapshot in the Prometheus
//! text format. Metric names and label sets are constructed at run time
//! from build statistics, so identity is (name, ordered label values)
//! rather than a fixed schema.
//!
//! # Architecture
//!
//! ```text
//! MetricStore
//!   ├── set() ← called per sample by every scrape pipeline
//!   └── snapshot() → point-in-time copy for the exposition handler
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for the telemetry endpoint
//! ```

pub mod exposition;
pub mod naming;
pub mod store;

pub use exposition::render_prometheus;
pub use naming::{metric_name, snake_case, NAMESPACE};
pub use store::{Label, MetricStore, Sample};

//! tcx-scraper — the per-instance scrape pipeline.
//!
//! Each scrape turns a scheduler tick into gauge entries in the shared
//! [`tcx_metrics::MetricStore`] through a four-stage fan-out/fan-in flow:
//!
//! ```text
//! tick → expand_filters → fetch_builds → fetch_statistics → parse_statistics → store
//!          (wildcards       (one task       (one task          (writes samples)
//!           resolved)        per filter)     per build)
//! ```
//!
//! Stages are connected by bounded mpsc channels. The two fetch stages
//! spawn one task per in-flight item and close their output only after
//! every task has joined, so the pipeline completes exactly when all
//! spawned work does. Failures never cross stage boundaries: a failed
//! query or unparseable value is logged and that one item is dropped.

pub mod expander;
pub mod pipeline;
pub mod prober;
pub mod scheduler;
pub mod types;

pub use expander::expand_filters;
pub use pipeline::{run_scrape, statistics_samples};
pub use prober::{probe_instance, run_prober};
pub use scheduler::run_instance;
pub use types::{BuildFilter, BuildStatistics, FilteredBuild};

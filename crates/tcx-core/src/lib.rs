//! tcx-core — configuration for the TeamCity exporter.
//!
//! Defines the on-disk configuration shape (instances and their build
//! filters), file loading, and startup validation. A parse or validation
//! failure is fatal: scraping never starts on a bad config.

pub mod config;

pub use config::{ConfigError, Configuration, FilterConfig, FilterSelector, InstanceConfig};

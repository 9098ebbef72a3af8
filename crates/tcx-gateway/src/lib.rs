//! tcx-gateway — REST client for the TeamCity API.
//!
//! Wraps the handful of read-only endpoints the exporter needs: build
//! configurations, branches, builds by locator, and per-build statistics,
//! plus an authenticated reachability probe. Every call is fallible and
//! callers treat failures as non-fatal: log, drop the affected item, move
//! on.
//!
//! The scrape pipeline consumes the [`BuildServerGateway`] trait rather
//! than the concrete client, so tests drive it with an in-memory fake.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BuildServerGateway, TeamCityClient};
pub use error::GatewayError;
pub use types::{Branch, Build, BuildLocator, BuildType, StatProperty};

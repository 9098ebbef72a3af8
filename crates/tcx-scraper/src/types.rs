//! Items flowing between pipeline stages.

use tcx_gateway::{Build, BuildLocator, StatProperty};

/// A fully resolved filter: one concrete build locator plus the names
/// that will label its samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFilter {
    /// Configured filter name (or `"default"`).
    pub name: String,
    /// Owning instance name.
    pub instance: String,
    pub locator: BuildLocator,
}

/// A build paired with the filter that selected it.
#[derive(Debug, Clone)]
pub struct FilteredBuild {
    pub details: Build,
    pub filter: BuildFilter,
}

/// A build paired with its statistics properties.
#[derive(Debug, Clone)]
pub struct BuildStatistics {
    pub build: FilteredBuild,
    pub properties: Vec<StatProperty>,
}

//! Filter expansion: configured selectors → concrete build locators.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::error;

use tcx_core::{FilterConfig, FilterSelector, InstanceConfig};
use tcx_gateway::{BuildLocator, BuildServerGateway};

use crate::types::BuildFilter;

/// Expand an instance's configured filters into concrete build locators.
///
/// A wildcard build-type selector is resolved by listing all build
/// configurations; a wildcard branch selector by listing the branches of
/// each candidate. Every emitted locator selects the single most recent
/// build. Filters are sent as soon as they are computed, so downstream
/// stages start querying while expansion continues.
///
/// Failure handling follows the per-item isolation rule: a failed
/// configuration query skips the whole filter, a failed branch query
/// skips that one build type, and siblings proceed either way.
pub async fn expand_filters(
    gateway: Arc<dyn BuildServerGateway>,
    instance: &InstanceConfig,
    tx: mpsc::Sender<BuildFilter>,
) {
    let configured = if instance.builds_filters.is_empty() {
        vec![default_filter()]
    } else {
        instance.builds_filters.clone()
    };

    for filter in configured {
        let candidates: Vec<String> = if filter.filter.build_type.is_empty() {
            match gateway.list_build_configurations().await {
                Ok(build_types) => build_types.into_iter().map(|bt| bt.id).collect(),
                Err(err) => {
                    error!(
                        instance = %instance.name,
                        filter = %filter.name,
                        error = %err,
                        "failed to query available build configurations"
                    );
                    continue;
                }
            }
        } else {
            vec![filter.filter.build_type.clone()]
        };

        for build_type in candidates {
            let branches: Vec<String> = if filter.filter.branch.is_empty() {
                match gateway.list_branches(&build_type).await {
                    Ok(branches) if branches.len() > 1 => {
                        branches.into_iter().map(|b| b.name).collect()
                    }
                    // A lone resolved branch is the default branch;
                    // TeamCity ignores an explicit filter on it, so query
                    // without one.
                    Ok(_) => vec![String::new()],
                    Err(err) => {
                        error!(
                            instance = %instance.name,
                            build_type = %build_type,
                            error = %err,
                            "failed to query branches for build configuration"
                        );
                        continue;
                    }
                }
            } else {
                vec![filter.filter.branch.clone()]
            };

            for branch in branches {
                let expanded = BuildFilter {
                    name: filter.name.clone(),
                    instance: instance.name.clone(),
                    locator: BuildLocator::latest(build_type.clone(), branch),
                };
                if tx.send(expanded).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// The filter used when an instance configures none: everything, most
/// recent build only.
fn default_filter() -> FilterConfig {
    FilterConfig {
        name: "default".to_string(),
        filter: FilterSelector::default(),
    }
}

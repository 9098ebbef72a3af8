//! Exporter configuration parsing and validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scrape interval applied when an instance does not set one.
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 60;

/// Errors raised while loading or validating the configuration file.
///
/// All of these abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no instances configured")]
    NoInstances,

    #[error("instance #{index} has an empty name")]
    EmptyInstanceName { index: usize },

    #[error("duplicate instance name '{name}'")]
    DuplicateInstance { name: String },

    #[error("instance '{name}' has an invalid url '{url}': {source}")]
    InvalidUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("instance '{name}' has a zero scrape interval")]
    ZeroInterval { name: String },

    #[error("instance '{name}' has a filter with an empty name")]
    EmptyFilterName { name: String },

    #[error("instance '{name}' has a duplicate filter name '{filter}'")]
    DuplicateFilter { name: String, filter: String },
}

/// Top-level exporter configuration: one entry per TeamCity instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

/// One TeamCity instance to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Identity of the instance; exported as the `instance` /
    /// `exporter_instance` label value.
    pub name: String,
    /// Base URL of the TeamCity server.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Seconds between scrape ticks.
    #[serde(default = "default_interval")]
    pub scrape_interval: u64,
    /// Build filters. Empty means "everything": a default filter with
    /// unrestricted selectors is synthesized at scrape time.
    #[serde(default)]
    pub builds_filters: Vec<FilterConfig>,
}

/// A named build filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exported as the `exporter_filter` label value.
    pub name: String,
    #[serde(default)]
    pub filter: FilterSelector,
}

/// Selector part of a filter. Empty fields select everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSelector {
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub branch: String,
}

fn default_interval() -> u64 {
    DEFAULT_SCRAPE_INTERVAL_SECS
}

impl Configuration {
    /// Load and parse the configuration from a TOML file.
    ///
    /// Callers must still run [`Configuration::validate`] before use.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Check the configuration for fatal mistakes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::NoInstances);
        }

        let mut names = HashSet::new();
        for (index, instance) in self.instances.iter().enumerate() {
            if instance.name.is_empty() {
                return Err(ConfigError::EmptyInstanceName { index });
            }
            if !names.insert(instance.name.as_str()) {
                return Err(ConfigError::DuplicateInstance {
                    name: instance.name.clone(),
                });
            }
            if let Err(source) = url::Url::parse(&instance.url) {
                return Err(ConfigError::InvalidUrl {
                    name: instance.name.clone(),
                    url: instance.url.clone(),
                    source,
                });
            }
            if instance.scrape_interval == 0 {
                return Err(ConfigError::ZeroInterval {
                    name: instance.name.clone(),
                });
            }

            let mut filters = HashSet::new();
            for filter in &instance.builds_filters {
                if filter.name.is_empty() {
                    return Err(ConfigError::EmptyFilterName {
                        name: instance.name.clone(),
                    });
                }
                if !filters.insert(filter.name.as_str()) {
                    return Err(ConfigError::DuplicateFilter {
                        name: instance.name.clone(),
                        filter: filter.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Configuration {
        toml::from_str(toml_str).unwrap()
    }

    fn minimal_instance() -> &'static str {
        r#"
[[instances]]
name = "prod"
url = "https://teamcity.example.com"
username = "exporter"
password = "secret"
"#
    }

    #[test]
    fn parse_minimal() {
        let config = parse(minimal_instance());
        assert_eq!(config.instances.len(), 1);
        let instance = &config.instances[0];
        assert_eq!(instance.name, "prod");
        assert_eq!(instance.scrape_interval, DEFAULT_SCRAPE_INTERVAL_SECS);
        assert!(instance.builds_filters.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn parse_with_filters() {
        let config = parse(
            r#"
[[instances]]
name = "prod"
url = "https://teamcity.example.com"
username = "exporter"
password = "secret"
scrape_interval = 30

[[instances.builds_filters]]
name = "release"
filter = { build_type = "Project_Release", branch = "master" }

[[instances.builds_filters]]
name = "nightly"
filter = { build_type = "Project_Nightly" }
"#,
        );
        config.validate().unwrap();

        let instance = &config.instances[0];
        assert_eq!(instance.scrape_interval, 30);
        assert_eq!(instance.builds_filters.len(), 2);
        assert_eq!(instance.builds_filters[0].filter.branch, "master");
        // Branch selector defaults to unrestricted.
        assert_eq!(instance.builds_filters[1].filter.branch, "");
    }

    #[test]
    fn empty_config_is_rejected() {
        let config = parse("");
        assert!(matches!(config.validate(), Err(ConfigError::NoInstances)));
    }

    #[test]
    fn duplicate_instance_names_rejected() {
        let mut config = parse(minimal_instance());
        config.instances.push(config.instances[0].clone());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateInstance { .. })
        ));
    }

    #[test]
    fn invalid_url_rejected() {
        let mut config = parse(minimal_instance());
        config.instances[0].url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = parse(minimal_instance());
        config.instances[0].scrape_interval = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroInterval { .. })
        ));
    }

    #[test]
    fn duplicate_filter_names_rejected() {
        let mut config = parse(minimal_instance());
        let filter = FilterConfig {
            name: "release".to_string(),
            filter: FilterSelector::default(),
        };
        config.instances[0].builds_filters = vec![filter.clone(), filter];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateFilter { .. })
        ));
    }

    #[test]
    fn empty_filter_name_rejected() {
        let mut config = parse(minimal_instance());
        config.instances[0].builds_filters = vec![FilterConfig {
            name: String::new(),
            filter: FilterSelector::default(),
        }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyFilterName { .. })
        ));
    }
}

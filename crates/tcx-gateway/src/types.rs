//! Wire types for the TeamCity REST API.
//!
//! TeamCity wraps every collection in a counted envelope
//! (`{"count": 2, "buildType": [...]}`); the envelopes stay private to
//! this crate and the flattened item types are what callers see.

use serde::Deserialize;

/// A build configuration (TeamCity "buildType").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildType {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A branch of a build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

/// One build record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: i64,
    #[serde(default)]
    pub build_type_id: String,
    /// Empty for builds on the default branch.
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub web_url: String,
}

/// A name/value statistics property attached to a build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatProperty {
    pub name: String,
    pub value: String,
}

/// Query descriptor for selecting builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildLocator {
    pub build_type: String,
    pub branch: String,
    pub count: u32,
}

impl BuildLocator {
    /// Locator for the single most recent build of one build type.
    pub fn latest(build_type: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            build_type: build_type.into(),
            branch: branch.into(),
            count: 1,
        }
    }

    /// Render as a TeamCity locator string. Empty dimensions are omitted;
    /// TeamCity treats an absent branch dimension as "default branch".
    pub fn to_query(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.build_type.is_empty() {
            parts.push(format!("buildType:{}", self.build_type));
        }
        if !self.branch.is_empty() {
            parts.push(format!("branch:{}", self.branch));
        }
        parts.push(format!("count:{}", self.count));
        parts.join(",")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildTypesResponse {
    #[serde(default, rename = "buildType")]
    pub build_type: Vec<BuildType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchesResponse {
    #[serde(default, rename = "branch")]
    pub branch: Vec<Branch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildsResponse {
    #[serde(default, rename = "build")]
    pub build: Vec<Build>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatisticsResponse {
    #[serde(default, rename = "property")]
    pub property: Vec<StatProperty>,
}

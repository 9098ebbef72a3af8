//! HTTP client for the TeamCity REST API.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::GatewayError;
use crate::types::{
    Branch, BranchesResponse, Build, BuildLocator, BuildType, BuildTypesResponse, BuildsResponse,
    StatProperty, StatisticsResponse,
};

/// Read-only view of a build server, as the scrape pipeline sees it.
///
/// The production implementation is [`TeamCityClient`]; tests inject an
/// in-memory fake.
#[async_trait]
pub trait BuildServerGateway: Send + Sync {
    /// All build configurations visible to the configured credentials.
    async fn list_build_configurations(&self) -> Result<Vec<BuildType>, GatewayError>;

    /// All branches with builds for one build configuration.
    async fn list_branches(&self, build_type_id: &str) -> Result<Vec<Branch>, GatewayError>;

    /// Builds matching a locator.
    async fn query_builds(&self, locator: &BuildLocator) -> Result<Vec<Build>, GatewayError>;

    /// Statistics properties of one build.
    async fn build_statistics(&self, build_id: i64) -> Result<Vec<StatProperty>, GatewayError>;

    /// Reachability and credential check against the server root.
    ///
    /// Fails only on transport errors or HTTP 401; any other status means
    /// the server is there and the credentials were accepted.
    async fn probe(&self) -> Result<(), GatewayError>;
}

/// REST client for one TeamCity instance.
///
/// Requests carry basic auth and `Accept: application/json`. There is
/// deliberately no request timeout: a slow server delays only the pipeline
/// stage waiting on it.
#[derive(Debug)]
pub struct TeamCityClient {
    base: Url,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl TeamCityClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            username: username.to_string(),
            password: password.to_string(),
            http: reqwest::Client::builder()
                .build()
                .map_err(GatewayError::Client)?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: Option<(&str, &str)>,
    ) -> Result<T, GatewayError> {
        let mut url = self.base.join(path)?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        debug!(url = %url, "gateway request");

        let resp = self
            .http
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status.is_success() {
            resp.json().await.map_err(|source| GatewayError::Decode {
                url: url.to_string(),
                source,
            })
        } else if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(GatewayError::Unauthorized {
                url: url.to_string(),
            })
        } else {
            Err(GatewayError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl BuildServerGateway for TeamCityClient {
    async fn list_build_configurations(&self) -> Result<Vec<BuildType>, GatewayError> {
        self.get_json::<BuildTypesResponse>("app/rest/buildTypes", None)
            .await
            .map(|r| r.build_type)
    }

    async fn list_branches(&self, build_type_id: &str) -> Result<Vec<Branch>, GatewayError> {
        let path = format!("app/rest/buildTypes/id:{build_type_id}/branches");
        self.get_json::<BranchesResponse>(&path, None)
            .await
            .map(|r| r.branch)
    }

    async fn query_builds(&self, locator: &BuildLocator) -> Result<Vec<Build>, GatewayError> {
        self.get_json::<BuildsResponse>("app/rest/builds", Some(("locator", &locator.to_query())))
            .await
            .map(|r| r.build)
    }

    async fn build_statistics(&self, build_id: i64) -> Result<Vec<StatProperty>, GatewayError> {
        let path = format!("app/rest/builds/id:{build_id}/statistics");
        self.get_json::<StatisticsResponse>(&path, None)
            .await
            .map(|r| r.property)
    }

    async fn probe(&self) -> Result<(), GatewayError> {
        let url = self.base.clone();
        let resp = self
            .http
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.to_string(),
                source,
            })?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized {
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_valid_url() {
        let client = TeamCityClient::new("https://teamcity.example.com", "user", "pass").unwrap();
        assert_eq!(client.base.as_str(), "https://teamcity.example.com/");
    }

    #[test]
    fn client_rejects_invalid_url() {
        let err = TeamCityClient::new("not a url", "user", "pass").unwrap_err();
        assert!(matches!(err, GatewayError::Url(_)));
    }

    #[test]
    fn endpoint_paths_resolve_against_base() {
        let client = TeamCityClient::new("https://teamcity.example.com", "user", "pass").unwrap();
        let url = client.base.join("app/rest/buildTypes").unwrap();
        assert_eq!(url.as_str(), "https://teamcity.example.com/app/rest/buildTypes");

        let url = client
            .base
            .join("app/rest/buildTypes/id:Project_Release/branches")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://teamcity.example.com/app/rest/buildTypes/id:Project_Release/branches"
        );
    }
}

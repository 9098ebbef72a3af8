//! Exporter regression tests.
//!
//! Validates the assembled surface: configuration parsing the way the
//! daemon consumes it, and the exposition endpoint rendering the gauges
//! the scrape pipeline and prober maintain.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use tcx_core::Configuration;
use tcx_metrics::naming::{
    INSTANCE_LAST_SCRAPE_DURATION, INSTANCE_LAST_SCRAPE_FINISH_TIME, INSTANCE_STATUS,
};
use tcx_metrics::{Label, MetricStore, Sample};
use tcx_web::build_router;

const EXAMPLE_CONFIG: &str = r#"
[[instances]]
name = "prod"
url = "https://teamcity.example.com"
username = "exporter"
password = "secret"
scrape_interval = 60

[[instances.builds_filters]]
name = "release"
filter = { build_type = "Project_Release", branch = "master" }

[[instances]]
name = "staging"
url = "https://teamcity-staging.example.com"
username = "exporter"
password = "secret"
"#;

fn instance_label(name: &str) -> Vec<Label> {
    vec![Label::new("instance", name)]
}

async fn render(store: MetricStore) -> String {
    let router = build_router(store, "/metrics");
    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[test]
fn example_config_parses_and_validates() {
    let config: Configuration = toml::from_str(EXAMPLE_CONFIG).unwrap();
    config.validate().unwrap();

    assert_eq!(config.instances.len(), 2);
    assert_eq!(config.instances[0].builds_filters.len(), 1);
    // The second instance relies on defaults.
    assert_eq!(config.instances[1].scrape_interval, 60);
    assert!(config.instances[1].builds_filters.is_empty());
}

#[test]
fn shipped_example_config_is_valid() {
    let content = std::fs::read_to_string(
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../config.example.toml"),
    )
    .unwrap();
    let config: Configuration = toml::from_str(&content).unwrap();
    config.validate().unwrap();
}

#[tokio::test]
async fn exposition_renders_instance_gauges() {
    let store = MetricStore::new();
    store
        .set(Sample::new(INSTANCE_STATUS, instance_label("prod"), 1.0))
        .await;
    store
        .set(Sample::new(
            INSTANCE_LAST_SCRAPE_FINISH_TIME,
            instance_label("prod"),
            1_700_000_000.0,
        ))
        .await;
    store
        .set(Sample::new(
            INSTANCE_LAST_SCRAPE_DURATION,
            instance_label("prod"),
            2.5,
        ))
        .await;

    let body = render(store).await;
    assert!(body.contains("teamcity_instance_status{instance=\"prod\"} 1"));
    assert!(body.contains("teamcity_instance_last_scrape_finish_time{instance=\"prod\"} 1700000000"));
    assert!(body.contains("teamcity_instance_last_scrape_duration{instance=\"prod\"} 2.5"));
}

#[tokio::test]
async fn exposition_renders_per_instance_status_separately() {
    let store = MetricStore::new();
    store
        .set(Sample::new(INSTANCE_STATUS, instance_label("prod"), 1.0))
        .await;
    store
        .set(Sample::new(INSTANCE_STATUS, instance_label("staging"), 0.0))
        .await;

    let body = render(store).await;
    assert!(body.contains("teamcity_instance_status{instance=\"prod\"} 1"));
    assert!(body.contains("teamcity_instance_status{instance=\"staging\"} 0"));
    // One header pair for the shared metric name.
    assert_eq!(body.matches("# TYPE teamcity_instance_status gauge").count(), 1);
}

#[tokio::test]
async fn exposition_renders_dynamic_statistics() {
    let store = MetricStore::new();
    store
        .set(Sample::new(
            "teamcity_success_rate",
            vec![
                Label::new("exporter_instance", "prod"),
                Label::new("exporter_filter", "release"),
                Label::new("build_configuration", "Project_Release"),
                Label::new("branch", "master"),
                Label::new("other", "unit=percent"),
            ],
            87.5,
        ))
        .await;

    let body = render(store).await;
    assert!(body.contains(
        "teamcity_success_rate{exporter_instance=\"prod\",exporter_filter=\"release\",\
         build_configuration=\"Project_Release\",branch=\"master\",other=\"unit=percent\"} 87.5"
    ));
}

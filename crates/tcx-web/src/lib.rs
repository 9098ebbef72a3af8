//! tcx-web — HTTP surface of the exporter.
//!
//! Serves a small landing page at `/` and the Prometheus exposition
//! endpoint at the configured telemetry path. The exposition handler is
//! the store's only reader: it takes a snapshot and renders it, fully
//! asynchronous to the scrape pipelines writing underneath it.

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tracing::debug;

use tcx_metrics::{MetricStore, render_prometheus};

/// Content type of the Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared state for the exposition handlers.
#[derive(Clone)]
pub struct WebState {
    pub store: MetricStore,
    pub telemetry_path: String,
}

/// Build the exporter router: landing page at `/`, exposition at
/// `telemetry_path` (a leading slash is added if missing).
pub fn build_router(store: MetricStore, telemetry_path: &str) -> Router {
    let telemetry_path = if telemetry_path.starts_with('/') {
        telemetry_path.to_string()
    } else {
        format!("/{telemetry_path}")
    };

    let state = WebState {
        store,
        telemetry_path: telemetry_path.clone(),
    };

    Router::new()
        .route("/", get(index))
        .route(&telemetry_path, get(metrics))
        .with_state(state)
}

/// GET `<telemetry_path>` — render the current store snapshot.
async fn metrics(State(state): State<WebState>) -> impl IntoResponse {
    let samples = state.store.snapshot().await;
    debug!(samples = samples.len(), "rendering exposition");
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        render_prometheus(&samples),
    )
}

/// GET `/` — landing page linking to the telemetry path.
async fn index(State(state): State<WebState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>TeamCity Exporter</title></head>\n\
         <body>\n\
         <h1>TeamCity Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>",
        state.telemetry_path
    ))
}

//! API server — serves the dashboard JSON endpoints over HTTP.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use campaign_cache::TableCache;
use campaign_core::config::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the router over a shared state. Exposed for in-process tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Dashboard endpoints
        .route("/v1/filters", get(rest::filter_options))
        .route("/v1/dashboard", get(rest::dashboard))
        .route("/v1/campaigns", get(rest::campaigns))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server owning the session's table cache.
pub struct ApiServer {
    config: AppConfig,
    cache: Arc<TableCache>,
}

impl ApiServer {
    pub fn new(config: AppConfig, cache: Arc<TableCache>) -> Self {
        Self { config, cache }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            dataset_path: PathBuf::from(&self.config.dataset.path),
            cache: self.cache.clone(),
            start_time: Instant::now(),
        };

        let app = router(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, dataset = %self.config.dataset.path, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use campaign_datagen::DatasetGenerator;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tower::ServiceExt;

    fn state_for(path: PathBuf) -> AppState {
        AppState {
            dataset_path: path,
            cache: Arc::new(TableCache::new()),
            start_time: Instant::now(),
        }
    }

    fn generated_dataset() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir()
            .join(format!("campaign-api-{}-{nanos}", std::process::id()))
            .join("campaigns.csv");
        DatasetGenerator::new().write_csv(&path).unwrap();
        path
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_dashboard_summary_and_no_data() {
        let path = generated_dataset();
        let state = state_for(path.clone());

        let (status, body) = get_json(router(state.clone()), "/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "summary");
        assert_eq!(body["campaigns"], 50);
        assert_eq!(body["dataset_digest"].as_str().map(str::len), Some(64));

        let (status, body) =
            get_json(router(state.clone()), "/v1/dashboard?channel=email&region=Norte").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "no_data");

        // both requests share one cached table
        assert_eq!(state.cache.len(), 1);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_campaigns_and_filters() {
        let path = generated_dataset();
        let state = state_for(path.clone());

        let (status, body) = get_json(router(state.clone()), "/v1/filters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["campaigns"], 50);
        assert_eq!(body["channels"].as_array().unwrap().len(), 3);

        let (status, body) = get_json(router(state.clone()), "/v1/campaigns?channel=Email").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 10);
        assert_eq!(body["records"][0]["Channel"], "Email");

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_missing_dataset_is_service_unavailable() {
        let state = state_for(PathBuf::from("/nonexistent/campaigns.csv"));
        let (status, body) = get_json(router(state), "/v1/dashboard").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "dataset_missing");
        assert!(body["message"].as_str().unwrap().contains("generate-dataset"));
    }

    #[tokio::test]
    async fn test_unreadable_dataset_is_service_unavailable() {
        let dir = std::env::temp_dir().join(format!("campaign-api-dir-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let (status, body) = get_json(router(state_for(dir.clone())), "/v1/filters").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "dataset_unreadable");
        assert!(body["message"].as_str().unwrap().contains("generate-dataset"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_channel_is_bad_request() {
        let state = state_for(PathBuf::from("/nonexistent/campaigns.csv"));
        let (status, body) = get_json(router(state), "/v1/dashboard?channel=Radio").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_filter");
    }
}

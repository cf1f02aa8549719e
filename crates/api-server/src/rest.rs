//! REST handlers for the campaign dashboard and operational endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaign_cache::TableCache;
use campaign_core::{CampaignError, Channel, EnrichedRecord, EnrichedTable};
use campaign_reporting::{aggregate, filter, load_and_process, AggregateOutcome, FilterCriteria, Selection};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub dataset_path: PathBuf,
    pub cache: Arc<TableCache>,
    pub start_time: Instant,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Build filter criteria from `channel`, `region` and `device` query keys.
/// Keys may repeat and values may be comma-separated; a key given with an
/// empty value selects nothing.
pub fn parse_criteria(pairs: &[(String, String)]) -> Result<FilterCriteria, String> {
    let mut channels: Option<BTreeSet<Channel>> = None;
    let mut regions: Option<BTreeSet<String>> = None;
    let mut devices: Option<BTreeSet<String>> = None;

    for (key, value) in pairs {
        let items = value.split(',').map(str::trim).filter(|s| !s.is_empty());
        match key.as_str() {
            "channel" => {
                let set = channels.get_or_insert_with(BTreeSet::new);
                for item in items {
                    set.insert(item.parse::<Channel>()?);
                }
            }
            "region" => regions
                .get_or_insert_with(BTreeSet::new)
                .extend(items.map(str::to_string)),
            "device" => devices
                .get_or_insert_with(BTreeSet::new)
                .extend(items.map(str::to_string)),
            _ => {}
        }
    }

    Ok(FilterCriteria {
        channels: channels.map(Selection::Only).unwrap_or_default(),
        regions: regions.map(Selection::Only).unwrap_or_default(),
        devices: devices.map(Selection::Only).unwrap_or_default(),
    })
}

fn error_response(status: StatusCode, error: &str, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

async fn load_table(state: &AppState) -> Result<Arc<EnrichedTable>, (StatusCode, Json<ErrorResponse>)> {
    let path = state.dataset_path.clone();
    let cache = state.cache.clone();

    let loaded = tokio::task::spawn_blocking(move || load_and_process(&path, &cache))
        .await
        .map_err(|e| {
            error!(error = %e, "Dataset load task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal processing error".to_string(),
            )
        })?;

    loaded.map_err(|e| {
        metrics::counter!("api.errors").increment(1);
        match &e {
            CampaignError::DatasetMissing { .. } => {
                warn!(error = %e, "Dataset not available");
                error_response(StatusCode::SERVICE_UNAVAILABLE, "dataset_missing", e.to_string())
            }
            CampaignError::DatasetUnreadable { .. } => {
                warn!(error = %e, "Dataset not readable");
                error_response(StatusCode::SERVICE_UNAVAILABLE, "dataset_unreadable", e.to_string())
            }
            CampaignError::MalformedRow { .. } => {
                error!(error = %e, "Dataset rejected");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "malformed_dataset", e.to_string())
            }
            other => {
                error!(error = %other, "Dataset load failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal processing error".to_string(),
                )
            }
        }
    })
}

fn criteria_from_query(pairs: &[(String, String)]) -> Result<FilterCriteria, (StatusCode, Json<ErrorResponse>)> {
    parse_criteria(pairs).map_err(|msg| {
        warn!(error = %msg, "Filter validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        error_response(StatusCode::BAD_REQUEST, "invalid_filter", msg)
    })
}

/// GET /v1/filters — distinct values available for each selector.
pub async fn filter_options(State(state): State<AppState>) -> ApiResult<FilterOptions> {
    let table = load_table(&state).await?;
    Ok(Json(FilterOptions {
        campaigns: table.len(),
        channels: table.distinct_channels(),
        regions: table.distinct_regions(),
        devices: table.distinct_devices(),
        dataset_digest: table.source_digest.clone(),
    }))
}

/// GET /v1/dashboard — headline KPIs and per-channel rollups for a selection.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<DashboardResponse> {
    let criteria = criteria_from_query(&pairs)?;
    let table = load_table(&state).await?;

    let selected = filter(&table, &criteria);
    let outcome = aggregate(&selected);
    metrics::counter!("api.dashboard.requests").increment(1);
    if outcome.is_no_data() {
        metrics::counter!("api.dashboard.no_data").increment(1);
    }

    Ok(Json(DashboardResponse {
        dataset_digest: table.source_digest.clone(),
        outcome,
    }))
}

/// GET /v1/campaigns — enriched rows matching a selection.
pub async fn campaigns(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<CampaignsResponse> {
    let criteria = criteria_from_query(&pairs)?;
    let table = load_table(&state).await?;

    let selected = filter(&table, &criteria);
    Ok(Json(CampaignsResponse {
        count: selected.len(),
        records: selected.records,
    }))
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        dataset_path: state.dataset_path.display().to_string(),
        cached_tables: state.cache.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub campaigns: usize,
    pub channels: Vec<Channel>,
    pub regions: Vec<String>,
    pub devices: Vec<String>,
    pub dataset_digest: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dataset_digest: Option<String>,
    #[serde(flatten)]
    pub outcome: AggregateOutcome,
}

#[derive(Debug, Serialize)]
pub struct CampaignsResponse {
    pub count: usize,
    pub records: Vec<EnrichedRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub dataset_path: String,
    pub cached_tables: usize,
    pub uptime_secs: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_keys_select_everything() {
        let criteria = parse_criteria(&[]).unwrap();
        assert_eq!(criteria, FilterCriteria::all());
    }

    #[test]
    fn test_repeated_and_comma_separated_values() {
        let criteria = parse_criteria(&pairs(&[
            ("channel", "email,paid-ads"),
            ("region", "Sul"),
            ("region", "Nordeste"),
        ]))
        .unwrap();
        assert_eq!(
            criteria.channels,
            Selection::only([Channel::Email, Channel::PaidAds])
        );
        assert_eq!(
            criteria.regions,
            Selection::only(["Sul".to_string(), "Nordeste".to_string()])
        );
        assert!(criteria.devices.is_all());
    }

    #[test]
    fn test_empty_value_selects_nothing() {
        let criteria = parse_criteria(&pairs(&[("device", "")])).unwrap();
        assert_eq!(criteria.devices, Selection::Only(BTreeSet::new()));
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let err = parse_criteria(&pairs(&[("channel", "Radio")])).unwrap_err();
        assert!(err.contains("Radio"));
    }
}

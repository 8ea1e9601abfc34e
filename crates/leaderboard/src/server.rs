//! HTTP API over the catalog.
//!
//! Routes:
//!
//! - `GET /api/leaderboard?type=&search=&limit=` - ranked entries
//! - `GET /api/stats` - catalog totals
//! - `POST /api/sync` - run a sync and return its outcome
//! - `GET /api/publishers` - the verified-publisher allow-list

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::catalog::{self, CatalogError, DEFAULT_LEADERBOARD_LIMIT, LeaderboardQuery};
use crate::classify::VERIFIED_PUBLISHERS;
use crate::entity::catalog_entry::Model;
use crate::sync::{Discovery, SyncOutcome, SyncResponse};

/// Errors from running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error body returned by handlers.
#[derive(Debug)]
struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CatalogError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Query string of `GET /api/leaderboard`.
#[derive(Debug, Default, Deserialize)]
struct LeaderboardParams {
    /// `verified` or `community`; anything else means no filter.
    #[serde(rename = "type")]
    tier: Option<String>,
    search: Option<String>,
    limit: Option<u64>,
}

impl LeaderboardParams {
    fn into_query(self) -> LeaderboardQuery {
        LeaderboardQuery {
            tier: self.tier.and_then(|t| t.parse().ok()),
            search: self.search,
            limit: self.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
        }
    }
}

/// Body of `GET /api/stats`.
#[derive(Debug, Serialize)]
struct StatsResponse {
    total: u64,
    verified: u64,
    community: u64,
    total_stars: i64,
    last_synced: Option<DateTime<Utc>>,
}

/// Build the API router.
pub fn router(discovery: Arc<Discovery>) -> Router {
    Router::new()
        .route("/api/leaderboard", get(handle_leaderboard))
        .route("/api/stats", get(handle_stats))
        .route("/api/sync", post(handle_sync))
        .route("/api/publishers", get(handle_publishers))
        .with_state(discovery)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    discovery: Arc<Discovery>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(discovery))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn handle_leaderboard(
    State(discovery): State<Arc<Discovery>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<Model>>, ApiError> {
    let rows = catalog::leaderboard(discovery.db(), &params.into_query()).await?;
    Ok(Json(rows))
}

async fn handle_stats(
    State(discovery): State<Arc<Discovery>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = catalog::stats(discovery.db()).await?;
    Ok(Json(StatsResponse {
        total: stats.total,
        verified: stats.verified,
        community: stats.community,
        total_stars: stats.total_stars,
        last_synced: stats.last_synced_at,
    }))
}

/// The sync runs on its own task so a client that hangs up does not cancel
/// it half way.
async fn handle_sync(State(discovery): State<Arc<Discovery>>) -> (StatusCode, Json<SyncResponse>) {
    let outcome = tokio::spawn(async move { discovery.sync(None).await })
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Sync task ended abnormally");
            SyncOutcome::Failed {
                reason: e.to_string(),
            }
        });
    (sync_status(&outcome), Json(outcome.into()))
}

fn sync_status(outcome: &SyncOutcome) -> StatusCode {
    match outcome {
        SyncOutcome::Completed(_) => StatusCode::OK,
        SyncOutcome::Rejected { .. } => StatusCode::CONFLICT,
        SyncOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn handle_publishers() -> Json<&'static [&'static str]> {
    Json(&VERIFIED_PUBLISHERS[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::catalog_tier::CatalogTier;

    #[test]
    fn params_default_to_fifty_unfiltered() {
        let q = LeaderboardParams::default().into_query();
        assert_eq!(q.limit, 50);
        assert!(q.tier.is_none());
    }

    #[test]
    fn params_ignore_unknown_type() {
        let q = LeaderboardParams {
            tier: Some("gold".into()),
            ..Default::default()
        }
        .into_query();
        assert!(q.tier.is_none());

        let q = LeaderboardParams {
            tier: Some("verified".into()),
            limit: Some(5),
            search: Some("comfy".into()),
        }
        .into_query();
        assert_eq!(q.tier, Some(CatalogTier::Verified));
        assert_eq!(q.limit, 5);
        assert_eq!(q.search.as_deref(), Some("comfy"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = ApiError(CatalogError::invalid_input("limit")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sync_outcomes_map_to_status_codes() {
        assert_eq!(
            sync_status(&SyncOutcome::Completed(Default::default())),
            StatusCode::OK
        );
        assert_eq!(
            sync_status(&SyncOutcome::failed(&crate::sync::SyncError::AlreadyRunning)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            sync_status(&SyncOutcome::Failed {
                reason: "tag search failed".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn database_error_maps_to_internal_error() {
        let response =
            ApiError(CatalogError::Database(sea_orm::DbErr::Custom("boom".into()))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

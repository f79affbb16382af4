use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct InvalidateRequest {
    /// Source id to drop; every cached table when absent.
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct InvalidateResult {
    invalidated: Vec<String>,
    remaining: Vec<String>,
}

/// Drops cached tables so the next request re-downloads them.
pub(super) async fn invalidate_cache(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<InvalidateRequest>>,
) -> Result<Json<ApiResponse<InvalidateResult>>, ApiError> {
    let Json(request) = body.unwrap_or_default();

    let invalidated = match request.source {
        Some(source) => {
            if !state.repo.sources().sources.iter().any(|s| s.id == source) {
                return Err(ApiError::new(
                    req_id.0,
                    "not_found",
                    format!("unknown source '{source}'"),
                ));
            }
            if state.repo.invalidate(&source).await {
                vec![source]
            } else {
                Vec::new()
            }
        }
        None => {
            let cached = state.repo.cached_ids().await;
            state.repo.invalidate_all().await;
            cached
        }
    };

    tracing::info!(?invalidated, "admin cache invalidation");
    let remaining = state.repo.cached_ids().await;
    Ok(ApiResponse::new(
        InvalidateResult {
            invalidated,
            remaining,
        },
        req_id.0,
    ))
}

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use defis_analytics::{revenue_breakdown, RevenueBreakdown};

use crate::middleware::RequestId;

use super::{map_analytics_error, map_load_error, ApiError, ApiResponse, AppState};

pub(super) async fn list_labs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let revenue = state
        .repo
        .revenue()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(
        defis_analytics::list_labs(&revenue),
        req_id.0,
    ))
}

pub(super) async fn get_lab_revenue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(lab): Path<String>,
) -> Result<Json<ApiResponse<RevenueBreakdown>>, ApiError> {
    let breakdown = fetch_breakdown(&state, &req_id.0, &lab).await?;
    Ok(ApiResponse::new(breakdown, req_id.0))
}

pub(super) async fn fetch_breakdown(
    state: &AppState,
    request_id: &str,
    lab: &str,
) -> Result<RevenueBreakdown, ApiError> {
    let revenue = state
        .repo
        .revenue()
        .await
        .map_err(|e| map_load_error(request_id.to_owned(), &e))?;
    revenue_breakdown(&revenue, lab).map_err(|e| map_analytics_error(request_id.to_owned(), &e))
}

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use defis_analytics::{GroupComparison, GroupReport};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_analytics_error, map_load_error, parse_column, require_param, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct ColumnQuery {
    pub column: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    pub left: Option<String>,
    pub right: Option<String>,
    pub column: Option<String>,
}

pub(super) async fn list_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let products = state
        .repo
        .products()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(
        defis_analytics::list_groups(&products),
        req_id.0,
    ))
}

pub(super) async fn get_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group): Path<String>,
    Query(query): Query<ColumnQuery>,
) -> Result<Json<ApiResponse<GroupReport>>, ApiError> {
    let report = fetch_group(&state, &req_id.0, &group, query.column.as_deref()).await?;
    Ok(ApiResponse::new(report, req_id.0))
}

pub(super) async fn fetch_group(
    state: &AppState,
    request_id: &str,
    group: &str,
    column: Option<&str>,
) -> Result<GroupReport, ApiError> {
    let column = parse_column(request_id, column)?;
    let products = state
        .repo
        .products()
        .await
        .map_err(|e| map_load_error(request_id.to_owned(), &e))?;
    defis_analytics::group_report(&products, group, column)
        .map_err(|e| map_analytics_error(request_id.to_owned(), &e))
}

pub(super) async fn compare_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<GroupComparison>>, ApiError> {
    let left = require_param(&req_id.0, "left", query.left.as_deref())?;
    let right = require_param(&req_id.0, "right", query.right.as_deref())?;
    let column = parse_column(&req_id.0, query.column.as_deref())?;
    let products = state
        .repo
        .products()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;

    let comparison = defis_analytics::compare_groups(&products, left, right, column)
        .map_err(|e| map_analytics_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(comparison, req_id.0))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use defis_analytics::{
    default_entries, portfolio_report, AnalyticsError, Portfolio, PortfolioEntry, PortfolioReport,
    WeightedEntry,
};
use defis_core::RatingColumn;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_analytics_error, map_load_error, parse_column, require_param, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct DefaultsQuery {
    /// Comma-separated group names.
    pub groups: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PortfolioRequest {
    pub entries: Vec<PortfolioEntry>,
    #[serde(default)]
    pub column: Option<String>,
}

fn split_groups(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Equal starting weights for the selected groups, with product counts.
pub(super) async fn default_portfolio(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DefaultsQuery>,
) -> Result<Json<ApiResponse<Vec<WeightedEntry>>>, ApiError> {
    let groups = split_groups(require_param(&req_id.0, "groups", query.groups.as_deref())?);
    let portfolio = Portfolio::new(default_entries(&groups))
        .map_err(|e| map_analytics_error(req_id.0.clone(), &AnalyticsError::from(e)))?;
    let products = state
        .repo
        .products()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;

    let report = portfolio_report(&products, &portfolio, RatingColumn::default());
    Ok(ApiResponse::new(report.entries, req_id.0))
}

pub(super) async fn build_portfolio(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Json<ApiResponse<PortfolioReport>>, ApiError> {
    let report = fetch_report(&state, &req_id.0, request).await?;
    Ok(ApiResponse::new(report, req_id.0))
}

pub(super) async fn fetch_report(
    state: &AppState,
    request_id: &str,
    request: PortfolioRequest,
) -> Result<PortfolioReport, ApiError> {
    let column = parse_column(request_id, request.column.as_deref())?;
    let portfolio = Portfolio::new(request.entries)
        .map_err(|e| map_analytics_error(request_id.to_owned(), &AnalyticsError::from(e)))?;
    let products = state
        .repo
        .products()
        .await
        .map_err(|e| map_load_error(request_id.to_owned(), &e))?;

    let report = portfolio_report(&products, &portfolio, column);
    tracing::debug!(
        groups = portfolio.entries().len(),
        missing = report.missing_groups.len(),
        total_mass = report.total_mass,
        "portfolio report built"
    );
    Ok(report)
}

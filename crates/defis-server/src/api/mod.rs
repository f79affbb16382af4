mod admin;
mod devices;
mod drugs;
mod export;
mod groups;
mod portfolio;
mod revenue;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use defis_analytics::AnalyticsError;
use defis_core::RatingColumn;
use defis_export::ExportError;
use defis_loader::{DatasetRepository, LoadError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<DatasetRepository>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    cached_sources: Vec<String>,
}

/// Sorted distinct values a product can be looked up by.
#[derive(Debug, Serialize)]
pub(super) struct OptionList<K: Serialize> {
    key: K,
    values: Vec<String>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_load_error(request_id: String, error: &LoadError) -> ApiError {
    tracing::error!(error = %error, "dataset load failed");
    match error {
        LoadError::Http(_)
        | LoadError::UnexpectedStatus { .. }
        | LoadError::Parse { .. }
        | LoadError::MissingColumn { .. }
        | LoadError::InvalidValue { .. } => {
            ApiError::new(request_id, "upstream_error", error.to_string())
        }
        LoadError::Io { .. } | LoadError::UnknownDataset(_) | LoadError::Config(_) => {
            ApiError::new(request_id, "internal_error", "dataset load failed")
        }
    }
}

pub(super) fn map_analytics_error(request_id: String, error: &AnalyticsError) -> ApiError {
    let code = match error {
        AnalyticsError::UnknownGroup(_) | AnalyticsError::UnknownLab(_) => "not_found",
        AnalyticsError::Portfolio(_)
        | AnalyticsError::SameGroup(_)
        | AnalyticsError::InvalidKey(_) => "validation_error",
    };
    ApiError::new(request_id, code, error.to_string())
}

pub(super) fn map_export_error(request_id: String, error: &ExportError) -> ApiError {
    tracing::error!(error = %error, "xlsx export failed");
    ApiError::new(request_id, "internal_error", "export failed")
}

/// Parses the optional `column` query parameter; absent means benefit.
pub(super) fn parse_column(
    request_id: &str,
    column: Option<&str>,
) -> Result<RatingColumn, ApiError> {
    column.map_or(Ok(RatingColumn::default()), |raw| {
        raw.parse::<RatingColumn>()
            .map_err(|reason: String| ApiError::new(request_id, "validation_error", reason))
    })
}

/// Reads a required query parameter, rejecting blanks.
pub(super) fn require_param<'a>(
    request_id: &str,
    name: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ApiError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("query parameter '{name}' is required"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/drugs/options", get(drugs::list_drug_options))
        .route("/api/v1/drugs", get(drugs::get_drug))
        .route("/api/v1/devices/options", get(devices::list_device_options))
        .route("/api/v1/devices", get(devices::get_device))
        .route("/api/v1/groups", get(groups::list_groups))
        .route("/api/v1/groups/compare", get(groups::compare_groups))
        .route("/api/v1/groups/{group}", get(groups::get_group))
        .route("/api/v1/revenue/labs", get(revenue::list_labs))
        .route("/api/v1/revenue/labs/{lab}", get(revenue::get_lab_revenue))
        .route(
            "/api/v1/portfolio/defaults",
            get(portfolio::default_portfolio),
        )
        .route("/api/v1/portfolio", post(portfolio::build_portfolio))
        .route("/api/v1/export/drugs", get(export::export_drug))
        .route("/api/v1/export/devices", get(export::export_device))
        .route("/api/v1/export/groups/{group}", get(export::export_group))
        .route("/api/v1/export/revenue/{lab}", get(export::export_revenue))
        .route("/api/v1/export/portfolio", post(export::export_portfolio))
        .route(
            "/api/v1/export/portfolio/profile",
            post(export::export_portfolio_profile),
        )
}

fn admin_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/admin/cache/invalidate",
            post(admin::invalidate_cache),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(admin_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let cached_sources = state.repo.cached_ids().await;
    (
        StatusCode::OK,
        ApiResponse::new(
            HealthData {
                status: "ok",
                cached_sources,
            },
            req_id.0,
        ),
    )
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

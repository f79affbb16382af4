//! `.xlsx` downloads of the tables the JSON routes return.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Local;
use defis_export::{export_file_name, write_xlsx, TabularRecord, XLSX_CONTENT_TYPE};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::middleware::RequestId;

use super::{
    devices::{fetch_device, DeviceQuery},
    drugs::{fetch_drug, DrugQuery},
    groups::{fetch_group, ColumnQuery},
    map_export_error,
    portfolio::{fetch_report, PortfolioRequest},
    revenue::fetch_breakdown,
    ApiError, AppState,
};

/// `Content-Disposition` value carrying an ASCII fallback name and the
/// UTF-8 name.
fn content_disposition(file_name: &str) -> Option<HeaderValue> {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC);
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .ok()
}

fn xlsx_response<T: TabularRecord>(
    request_id: &str,
    rows: &[T],
    sheet: &str,
    prefix: &str,
    subject: Option<&str>,
) -> Result<Response, ApiError> {
    let bytes = write_xlsx(rows, sheet).map_err(|e| map_export_error(request_id.to_owned(), &e))?;
    let file_name = export_file_name(prefix, subject, Local::now().date_naive());
    let disposition = content_disposition(&file_name).ok_or_else(|| {
        ApiError::new(request_id, "internal_error", "invalid export file name")
    })?;

    tracing::info!(%file_name, rows = rows.len(), "xlsx export served");
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub(super) async fn export_drug(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DrugQuery>,
) -> Result<Response, ApiError> {
    let lookup = fetch_drug(&state, &req_id.0, &query).await?;
    xlsx_response(
        &req_id.0,
        &lookup.presentations,
        "Médicament",
        "medicament",
        Some(&lookup.value),
    )
}

pub(super) async fn export_device(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DeviceQuery>,
) -> Result<Response, ApiError> {
    let lookup = fetch_device(&state, &req_id.0, &query).await?;
    xlsx_response(
        &req_id.0,
        &lookup.devices,
        "Dispositif",
        "dispositif",
        Some(&lookup.value),
    )
}

pub(super) async fn export_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group): Path<String>,
    Query(query): Query<ColumnQuery>,
) -> Result<Response, ApiError> {
    let report = fetch_group(&state, &req_id.0, &group, query.column.as_deref()).await?;
    xlsx_response(
        &req_id.0,
        &report.products,
        &report.group,
        "groupe",
        Some(&report.group),
    )
}

pub(super) async fn export_revenue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(lab): Path<String>,
) -> Result<Response, ApiError> {
    let breakdown = fetch_breakdown(&state, &req_id.0, &lab).await?;
    xlsx_response(
        &req_id.0,
        &breakdown.lines,
        "CA",
        "CA",
        Some(&breakdown.lab),
    )
}

pub(super) async fn export_portfolio(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Response, ApiError> {
    let report = fetch_report(&state, &req_id.0, request).await?;
    xlsx_response(
        &req_id.0,
        &report.entries,
        "Portefeuille",
        "portefeuille",
        None,
    )
}

pub(super) async fn export_portfolio_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Response, ApiError> {
    let report = fetch_report(&state, &req_id.0, request).await?;
    xlsx_response(
        &req_id.0,
        &report.profile.entries,
        "Profil",
        "profil_portefeuille",
        Some(report.column.display_name()),
    )
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use defis_analytics::{drug_options, lookup_drug, DrugKey, DrugLookup};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_analytics_error, map_load_error, require_param, ApiError, ApiResponse, AppState,
    OptionList,
};

#[derive(Debug, Deserialize)]
pub(super) struct DrugQuery {
    pub by: Option<String>,
    pub value: Option<String>,
}

/// Lookup key from `by`; defaults to the drug name.
fn drug_key(request_id: &str, by: Option<&str>) -> Result<DrugKey, ApiError> {
    by.map_or(Ok(DrugKey::Name), |raw| {
        raw.parse::<DrugKey>()
            .map_err(|e| map_analytics_error(request_id.to_owned(), &e))
    })
}

pub(super) async fn list_drug_options(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DrugQuery>,
) -> Result<Json<ApiResponse<OptionList<DrugKey>>>, ApiError> {
    let key = drug_key(&req_id.0, query.by.as_deref())?;
    let catalogue = state
        .repo
        .catalogue()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;

    let data = OptionList {
        key,
        values: drug_options(&catalogue, key),
    };
    Ok(ApiResponse::new(data, req_id.0))
}

/// Looks up one drug by exact value. An unknown value yields an empty
/// lookup rather than an error.
pub(super) async fn get_drug(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DrugQuery>,
) -> Result<Json<ApiResponse<DrugLookup>>, ApiError> {
    let lookup = fetch_drug(&state, &req_id.0, &query).await?;
    Ok(ApiResponse::new(lookup, req_id.0))
}

pub(super) async fn fetch_drug(
    state: &AppState,
    request_id: &str,
    query: &DrugQuery,
) -> Result<DrugLookup, ApiError> {
    let key = drug_key(request_id, query.by.as_deref())?;
    let value = require_param(request_id, "value", query.value.as_deref())?;
    let catalogue = state
        .repo
        .catalogue()
        .await
        .map_err(|e| map_load_error(request_id.to_owned(), &e))?;
    Ok(lookup_drug(&catalogue, key, value))
}

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use defis_analytics::{device_options, lookup_device, DeviceKey, DeviceLookup};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_analytics_error, map_load_error, require_param, ApiError, ApiResponse, AppState,
    OptionList,
};

#[derive(Debug, Deserialize)]
pub(super) struct DeviceQuery {
    pub by: Option<String>,
    pub value: Option<String>,
}

fn device_key(request_id: &str, by: Option<&str>) -> Result<DeviceKey, ApiError> {
    by.map_or(Ok(DeviceKey::Name), |raw| {
        raw.parse::<DeviceKey>()
            .map_err(|e| map_analytics_error(request_id.to_owned(), &e))
    })
}

pub(super) async fn list_device_options(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<ApiResponse<OptionList<DeviceKey>>>, ApiError> {
    let key = device_key(&req_id.0, query.by.as_deref())?;
    let devices = state
        .repo
        .devices()
        .await
        .map_err(|e| map_load_error(req_id.0.clone(), &e))?;

    let data = OptionList {
        key,
        values: device_options(&devices, key),
    };
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_device(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<ApiResponse<DeviceLookup>>, ApiError> {
    let lookup = fetch_device(&state, &req_id.0, &query).await?;
    Ok(ApiResponse::new(lookup, req_id.0))
}

pub(super) async fn fetch_device(
    state: &AppState,
    request_id: &str,
    query: &DeviceQuery,
) -> Result<DeviceLookup, ApiError> {
    let key = device_key(request_id, query.by.as_deref())?;
    let value = require_param(request_id, "value", query.value.as_deref())?;
    let devices = state
        .repo
        .devices()
        .await
        .map_err(|e| map_load_error(request_id.to_owned(), &e))?;
    Ok(lookup_device(&devices, key, value))
}

use axum::{
    extract::{Json, State},
    response::IntoResponse,
};

use app_api::{AnalyzeRequest, UpgradeRequest};

use crate::{errors::HttpError, state::HttpState};

pub async fn analyze(
    State(state): State<HttpState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::analyze(&state.context, req).await?;
    Ok(Json(response))
}

pub async fn quota_get(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::quota_get(&state.context)?;
    Ok(Json(response))
}

pub async fn subscription_upgrade(
    State(state): State<HttpState>,
    Json(req): Json<UpgradeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::subscription_upgrade(&state.context, req)?;
    Ok(Json(response))
}

pub async fn scans_recent(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::scans_recent(&state.context)?;
    Ok(Json(response))
}

pub async fn insights_get(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::insights_get(&state.context)?;
    Ok(Json(response))
}

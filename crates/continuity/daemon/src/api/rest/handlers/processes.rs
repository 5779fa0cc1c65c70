//! Process and BIA assessment handlers

use crate::api::rest::caller::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use continuity_engine::{NewBiaAssessment, NewProcess};
use continuity_types::{BiaAssessment, BusinessProcess, ProcessId};

pub async fn register_process(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewProcess>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BusinessProcess>)> {
    let Json(request) = body?;
    let process = state
        .core
        .processes()
        .register_process(&caller.tenant, request)
        .await?;
    Ok((StatusCode::CREATED, Json(process)))
}

pub async fn remove_process(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .core
        .processes()
        .remove_process(&caller.tenant, &ProcessId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_bia_assessment(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewBiaAssessment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BiaAssessment>)> {
    let Json(request) = body?;
    let assessment = state
        .core
        .processes()
        .record_bia_assessment(&caller.tenant, request)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

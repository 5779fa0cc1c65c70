//! Risk assessment and control handlers

use crate::api::rest::caller::Caller;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use continuity_engine::{ControlUpdate, NewControl, NewRiskAssessment};
use continuity_types::{RiskAssessment, RiskAssessmentId, RiskControl, RiskControlId};
use serde::Serialize;

/// An assessment together with its attached controls
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentView {
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub controls: Vec<RiskControl>,
}

pub async fn create_risk_assessment(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewRiskAssessment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RiskAssessment>)> {
    let Json(request) = body?;
    let assessment = state
        .core
        .risk()
        .create_assessment(&caller.tenant, request)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn get_risk_assessment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<RiskAssessmentView>> {
    let id = RiskAssessmentId::new(id);
    let risk = state.core.risk();
    let assessment = risk.get_assessment(&caller.tenant, &id).await?;
    let controls = risk.controls_for(&caller.tenant, &id).await?;
    Ok(Json(RiskAssessmentView {
        assessment,
        controls,
    }))
}

pub async fn create_control(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewControl>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RiskControl>)> {
    let Json(request) = body?;
    let control = state
        .core
        .risk()
        .create_control(&caller.tenant, request)
        .await?;
    Ok((StatusCode::CREATED, Json(control)))
}

pub async fn update_control(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<ControlUpdate>, JsonRejection>,
) -> ApiResult<Json<RiskControl>> {
    let Json(update) = body?;
    let control = state
        .core
        .risk()
        .update_control(&caller.tenant, &RiskControlId::new(id), update)
        .await?;
    Ok(Json(control))
}

pub async fn delete_control(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .core
        .risk()
        .delete_control(&caller.tenant, &RiskControlId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn calculate_residual(
    State(state): State<AppState>,
    caller: Caller,
    Path(risk_id): Path<String>,
) -> ApiResult<Json<RiskAssessment>> {
    let assessment = state
        .core
        .risk()
        .calculate_residual_risk(&caller.tenant, &RiskAssessmentId::new(risk_id))
        .await?;
    Ok(Json(assessment))
}

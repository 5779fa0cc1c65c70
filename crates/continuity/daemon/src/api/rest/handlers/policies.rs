//! Governance policy handlers

use crate::api::rest::caller::Caller;
use crate::api::rest::state::AppState;
use crate::error::{optional_json, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use continuity_engine::NewPolicy;
use continuity_types::{PolicyDocument, PolicyId};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    #[serde(default)]
    pub comments: Option<String>,
}

pub async fn create_policy(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<NewPolicy>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PolicyDocument>)> {
    let Json(request) = body?;
    let policy = state.core.documents().create(&caller.tenant, request).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn get_policy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<PolicyDocument>> {
    let policy = state
        .core
        .documents()
        .get(&caller.tenant, &PolicyId::new(id))
        .await?;
    Ok(Json(policy))
}

pub async fn submit_policy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<PolicyDocument>> {
    let policy = state
        .core
        .documents()
        .submit_for_review(&caller.tenant, &PolicyId::new(id))
        .await?;
    Ok(Json(policy))
}

/// The body is optional; an absent body approves without comments
pub async fn approve_policy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<ApproveRequest>, JsonRejection>,
) -> ApiResult<Json<PolicyDocument>> {
    let comments = optional_json(body)?.and_then(|r| r.comments);
    let policy = state
        .core
        .documents()
        .approve(&caller.tenant, &PolicyId::new(id), &caller.user, comments)
        .await?;
    Ok(Json(policy))
}

pub async fn publish_policy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<PolicyDocument>> {
    let policy = state
        .core
        .documents()
        .publish(&caller.tenant, &PolicyId::new(id))
        .await?;
    Ok(Json(policy))
}

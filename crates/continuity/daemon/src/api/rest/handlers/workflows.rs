//! Workflow handlers

use crate::api::rest::caller::Caller;
use crate::api::rest::state::AppState;
use crate::error::{optional_json, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use continuity_types::{EntityType, Step, StepDecision, StepId, Workflow, WorkflowId};
use serde::{Deserialize, Serialize};

/// Workflow as returned to clients, with overdue steps labelled at read time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub overdue_steps: Vec<StepId>,
}

impl From<Workflow> for WorkflowView {
    fn from(workflow: Workflow) -> Self {
        let overdue_steps = workflow
            .overdue_steps(Utc::now())
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        Self {
            workflow,
            overdue_steps,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    pub entity_type: EntityType,
    pub entity_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    pub decision: StepDecision,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn list_entity_workflows(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<EntityQuery>,
) -> ApiResult<Json<Vec<WorkflowView>>> {
    let workflows = state
        .core
        .workflows()
        .workflows_for_entity(&caller.tenant, query.entity_type, &query.entity_id)
        .await?;
    Ok(Json(workflows.into_iter().map(WorkflowView::from).collect()))
}

pub async fn get_workflow(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowView>> {
    let workflow = state
        .core
        .workflows()
        .get_workflow(&caller.tenant, &WorkflowId::new(id))
        .await?;
    Ok(Json(workflow.into()))
}

pub async fn complete_step(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, step_id)): Path<(String, String)>,
    body: Result<Json<CompleteStepRequest>, JsonRejection>,
) -> ApiResult<Json<Step>> {
    let Json(request) = body?;
    let step = state
        .core
        .workflows()
        .complete_step(
            &caller.tenant,
            &WorkflowId::new(id),
            &StepId::new(step_id),
            request.decision,
            &caller.user,
        )
        .await?;
    Ok(Json(step))
}

pub async fn cancel_workflow(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<CancelRequest>, JsonRejection>,
) -> ApiResult<Json<WorkflowView>> {
    let reason = optional_json(body)?
        .and_then(|r| r.reason)
        .unwrap_or_else(|| format!("cancelled by {}", caller.user));
    let workflow = state
        .core
        .workflows()
        .cancel_workflow(&caller.tenant, &WorkflowId::new(id), &reason)
        .await?;
    Ok(Json(workflow.into()))
}

//! Workflow Engine: approval workflows bound to business entities
//!
//! Steps are a set, not a sequence. Any pending step may be decided at any
//! time; the workflow completes once every step is terminal. Concurrent
//! decisions on the same workflow are serialised with an optimistic
//! revision check and re-applied on a lost race.

use crate::{ContinuityError, ContinuityResult, EngineConfig, SharedStorage};
use chrono::{DateTime, Utc};
use continuity_storage::StorageError;
use continuity_types::{
    EntityKind, EntityType, Step, StepDecision, StepId, StepStatus, TenantId, UserId, Workflow,
    WorkflowId, WorkflowStatus,
};
use std::collections::HashSet;

/// Parameters for a new workflow
#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub name: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub steps: Vec<Step>,
}

#[derive(Clone)]
pub struct WorkflowEngine {
    storage: SharedStorage,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(storage: SharedStorage, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    /// Validate a request and build the workflow record without persisting it.
    ///
    /// Incoming steps are reset to PENDING; a caller cannot start a workflow
    /// with pre-decided steps.
    pub fn prepare_workflow(
        &self,
        tenant: &TenantId,
        request: NewWorkflow,
        created_by: &UserId,
        now: DateTime<Utc>,
    ) -> ContinuityResult<Workflow> {
        if request.steps.is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::Workflow,
                &request.entity_id,
                "a workflow needs at least one step",
            ));
        }
        if request.name.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::Workflow,
                &request.entity_id,
                "workflow name must not be blank",
            ));
        }

        let mut seen = HashSet::new();
        let mut steps = Vec::with_capacity(request.steps.len());
        for mut step in request.steps {
            if step.id.as_str().trim().is_empty() {
                return Err(ContinuityError::validation(
                    EntityKind::Step,
                    &step.id,
                    "step id must not be blank",
                ));
            }
            if !seen.insert(step.id.clone()) {
                return Err(ContinuityError::validation(
                    EntityKind::Step,
                    &step.id,
                    "step id is used more than once",
                ));
            }
            if step.assigned_to.is_empty() {
                return Err(ContinuityError::validation(
                    EntityKind::Step,
                    &step.id,
                    "step must be assigned to at least one user",
                ));
            }
            if step.due_date < now {
                return Err(ContinuityError::validation(
                    EntityKind::Step,
                    &step.id,
                    format!("due date {} is in the past", step.due_date.to_rfc3339()),
                ));
            }
            step.status = StepStatus::Pending;
            step.completed_at = None;
            step.completed_by = None;
            steps.push(step);
        }

        Ok(Workflow::new(
            tenant.clone(),
            request.name,
            request.entity_type,
            request.entity_id,
            steps,
            created_by.clone(),
            now,
        ))
    }

    /// Create and persist a PENDING workflow
    pub async fn start_workflow(
        &self,
        tenant: &TenantId,
        request: NewWorkflow,
        created_by: &UserId,
    ) -> ContinuityResult<Workflow> {
        let workflow = self.prepare_workflow(tenant, request, created_by, Utc::now())?;
        self.storage
            .insert_workflow(workflow.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Workflow, &workflow.id, e))?;

        tracing::info!(
            tenant = %tenant,
            workflow_id = %workflow.id,
            entity_type = %workflow.entity_type,
            entity_id = %workflow.entity_id,
            steps = workflow.steps.len(),
            "Workflow started"
        );
        Ok(workflow)
    }

    /// Record a decision on one step.
    ///
    /// Repeating the recorded decision returns the step unchanged. A
    /// different decision on a decided step is a conflict.
    pub async fn complete_step(
        &self,
        tenant: &TenantId,
        workflow_id: &WorkflowId,
        step_id: &StepId,
        decision: StepDecision,
        actor: &UserId,
    ) -> ContinuityResult<Step> {
        for attempt in 0..=self.config.max_write_retries {
            let mut workflow = self.load(tenant, workflow_id).await?;
            let step = workflow
                .step(step_id)
                .ok_or_else(|| ContinuityError::not_found(EntityKind::Step, step_id))?;

            if let Some(recorded) = step.decision() {
                if recorded == decision {
                    tracing::debug!(
                        workflow_id = %workflow_id,
                        step_id = %step_id,
                        decision = decision.as_str(),
                        "Step already carries this decision"
                    );
                    return Ok(step.clone());
                }
                return Err(ContinuityError::conflict(
                    EntityKind::Step,
                    step_id,
                    format!(
                        "step was already {}, cannot record {}",
                        recorded.as_str(),
                        decision.as_str()
                    ),
                ));
            }
            if step.status == StepStatus::Cancelled {
                return Err(ContinuityError::invalid_state(
                    EntityKind::Step,
                    step_id,
                    "step was cancelled",
                ));
            }
            if workflow.is_terminal() {
                return Err(ContinuityError::invalid_state(
                    EntityKind::Workflow,
                    workflow_id,
                    format!("workflow is {}", workflow.status.as_str()),
                ));
            }

            let expected = workflow.revision;
            workflow.apply_decision(step_id, decision, actor.clone(), Utc::now());

            match self.storage.replace_workflow(workflow, expected).await {
                Ok(stored) => {
                    tracing::info!(
                        tenant = %tenant,
                        workflow_id = %workflow_id,
                        step_id = %step_id,
                        decision = decision.as_str(),
                        status = stored.status.as_str(),
                        "Step completed"
                    );
                    return stored
                        .step(step_id)
                        .cloned()
                        .ok_or_else(|| ContinuityError::not_found(EntityKind::Step, step_id));
                }
                Err(StorageError::StaleRevision { found, .. }) => {
                    tracing::debug!(
                        workflow_id = %workflow_id,
                        attempt,
                        found_revision = found,
                        "Lost revision race, retrying"
                    );
                }
                Err(e) => return Err(ContinuityError::from_storage(EntityKind::Workflow, workflow_id, e)),
            }
        }

        tracing::warn!(
            workflow_id = %workflow_id,
            retries = self.config.max_write_retries,
            "Gave up completing step after repeated revision conflicts"
        );
        Err(ContinuityError::conflict(
            EntityKind::Workflow,
            workflow_id,
            "too many concurrent updates",
        ))
    }

    /// Cancel a workflow and every step not yet decided.
    ///
    /// Cancelling a cancelled workflow is a no-op.
    pub async fn cancel_workflow(
        &self,
        tenant: &TenantId,
        workflow_id: &WorkflowId,
        reason: &str,
    ) -> ContinuityResult<Workflow> {
        for attempt in 0..=self.config.max_write_retries {
            let mut workflow = self.load(tenant, workflow_id).await?;
            match workflow.status {
                WorkflowStatus::Cancelled => return Ok(workflow),
                WorkflowStatus::Completed => {
                    return Err(ContinuityError::invalid_state(
                        EntityKind::Workflow,
                        workflow_id,
                        "a completed workflow cannot be cancelled",
                    ))
                }
                WorkflowStatus::Pending | WorkflowStatus::InProgress => {}
            }

            let expected = workflow.revision;
            workflow.cancel(reason, Utc::now());
            match self.storage.replace_workflow(workflow, expected).await {
                Ok(stored) => {
                    tracing::info!(
                        tenant = %tenant,
                        workflow_id = %workflow_id,
                        reason,
                        "Workflow cancelled"
                    );
                    return Ok(stored);
                }
                Err(StorageError::StaleRevision { .. }) => {
                    tracing::debug!(workflow_id = %workflow_id, attempt, "Lost revision race, retrying");
                }
                Err(e) => return Err(ContinuityError::from_storage(EntityKind::Workflow, workflow_id, e)),
            }
        }

        Err(ContinuityError::conflict(
            EntityKind::Workflow,
            workflow_id,
            "too many concurrent updates",
        ))
    }

    pub async fn get_workflow(
        &self,
        tenant: &TenantId,
        workflow_id: &WorkflowId,
    ) -> ContinuityResult<Workflow> {
        self.load(tenant, workflow_id).await
    }

    /// Every workflow bound to one business entity, oldest first
    pub async fn workflows_for_entity(
        &self,
        tenant: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
    ) -> ContinuityResult<Vec<Workflow>> {
        Ok(self
            .storage
            .list_workflows_for_entity(tenant, entity_type, entity_id)
            .await?)
    }

    async fn load(&self, tenant: &TenantId, workflow_id: &WorkflowId) -> ContinuityResult<Workflow> {
        self.storage
            .get_workflow(tenant, workflow_id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::Workflow, workflow_id))
    }
}

//! Workflows: assignable, deadline-bound units of work bound to one entity
//!
//! A Workflow owns an ordered list of Steps fixed at creation. Steps are
//! completed individually and in any order; the workflow is complete once
//! every step has reached a terminal status. Each mutation appends to the
//! workflow's history so the decision trail can be replayed.

use crate::{StepId, TenantId, UserId, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ── Workflow ─────────────────────────────────────────────────────────

/// One instance of a multi-step process bound to a single business entity
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub tenant_id: TenantId,
    pub name: String,
    /// What kind of domain object this workflow tracks
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Steps in creation order; never reordered
    pub steps: Vec<Step>,
    pub status: WorkflowStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped by the store on every replace
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub history: Vec<WorkflowEvent>,
}

impl Workflow {
    /// Create a pending workflow. Validation of the step list is the
    /// caller's job; this only assembles the record.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        steps: Vec<Step>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let mut workflow = Self {
            id: WorkflowId::generate(),
            tenant_id,
            name: name.into(),
            entity_type,
            entity_id: entity_id.into(),
            steps,
            status: WorkflowStatus::Pending,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
            revision: 0,
            history: Vec::new(),
        };
        workflow.record(
            WorkflowEventKind::Started,
            Some(created_by),
            format!("Workflow started with {} step(s)", workflow.steps.len()),
            now,
        );
        workflow
    }

    pub fn step(&self, step_id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == step_id)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when every step has reached a terminal status
    pub fn all_steps_terminal(&self) -> bool {
        self.steps.iter().all(Step::is_terminal)
    }

    /// Steps still waiting for a decision
    pub fn pending_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Pending)
            .collect()
    }

    /// Pending steps whose due date has passed at `now`
    pub fn overdue_steps(&self, now: DateTime<Utc>) -> Vec<&Step> {
        self.pending_steps()
            .into_iter()
            .filter(|s| s.status_at(now) == StepStatus::Overdue)
            .collect()
    }

    /// Record a decision on a step and re-derive the workflow status.
    ///
    /// Returns `false` if the step does not exist. Callers enforce the
    /// idempotence and conflict rules before calling this.
    pub fn apply_decision(
        &mut self,
        step_id: &StepId,
        decision: StepDecision,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(step) = self.steps.iter_mut().find(|s| &s.id == step_id) else {
            return false;
        };
        step.status = decision.into();
        step.completed_at = Some(now);
        step.completed_by = Some(actor.clone());
        self.updated_at = now;
        self.record(
            WorkflowEventKind::StepCompleted,
            Some(actor),
            format!("Step '{}' {}", step_id, decision.as_str()),
            now,
        );

        if self.all_steps_terminal() {
            self.status = WorkflowStatus::Completed;
            self.record(
                WorkflowEventKind::Completed,
                None,
                "All steps reached a terminal status",
                now,
            );
        } else {
            self.status = WorkflowStatus::InProgress;
        }
        true
    }

    /// Cancel every non-terminal step and the workflow itself
    pub fn cancel(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        for step in self.steps.iter_mut().filter(|s| !s.is_terminal()) {
            step.status = StepStatus::Cancelled;
            step.completed_at = Some(now);
        }
        self.status = WorkflowStatus::Cancelled;
        self.updated_at = now;
        self.record(
            WorkflowEventKind::Cancelled,
            None,
            format!("Workflow cancelled: {}", reason.into()),
            now,
        );
    }

    fn record(
        &mut self,
        kind: WorkflowEventKind,
        actor: Option<UserId>,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        self.history.push(WorkflowEvent {
            sequence: self.history.len() as u64,
            kind,
            description: description.into(),
            actor,
            timestamp: at,
        });
    }
}

/// Lifecycle status of a workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// The domain object a workflow tracks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    BiaAssessment,
    PolicyDocument,
    RiskAssessment,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BiaAssessment => "bia-assessment",
            Self::PolicyDocument => "policy-document",
            Self::RiskAssessment => "risk-assessment",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Step ─────────────────────────────────────────────────────────────

/// One unit of work inside a workflow
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub name: String,
    pub assigned_to: BTreeSet<UserId>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<UserId>,
}

impl Step {
    pub fn new(
        id: impl Into<StepId>,
        step_type: StepType,
        name: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            step_type,
            name: name.into(),
            assigned_to: BTreeSet::new(),
            due_date,
            metadata: HashMap::new(),
            status: StepStatus::Pending,
            completed_at: None,
            completed_by: None,
        }
    }

    /// An approval step
    pub fn approval(id: impl Into<StepId>, name: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self::new(id, StepType::Approval, name, due_date)
    }

    pub fn with_assignee(mut self, user: UserId) -> Self {
        self.assigned_to.insert(user);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The decision recorded on this step, if any
    pub fn decision(&self) -> Option<StepDecision> {
        match self.status {
            StepStatus::Approved => Some(StepDecision::Approved),
            StepStatus::Rejected => Some(StepDecision::Rejected),
            _ => None,
        }
    }

    /// Status as seen at `now`: a pending step past its due date reads as
    /// overdue. The stored status never holds `Overdue`.
    pub fn status_at(&self, now: DateTime<Utc>) -> StepStatus {
        if self.status == StepStatus::Pending && self.due_date < now {
            StepStatus::Overdue
        } else {
            self.status
        }
    }
}

/// Kind of work a step represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// A yes/no sign-off by one of the assignees
    Approval,
}

/// Status of a step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Query-time label only
    Overdue,
    /// Superseded by workflow cancellation
    Cancelled,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }
}

/// A terminal decision submitted for a step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepDecision {
    Approved,
    Rejected,
}

impl StepDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl From<StepDecision> for StepStatus {
    fn from(decision: StepDecision) -> Self {
        match decision {
            StepDecision::Approved => StepStatus::Approved,
            StepDecision::Rejected => StepStatus::Rejected,
        }
    }
}

// ── History ──────────────────────────────────────────────────────────

/// An entry in a workflow's history
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    /// Monotonically increasing, starting at 0
    pub sequence: u64,
    pub kind: WorkflowEventKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEventKind {
    Started,
    StepCompleted,
    Completed,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_workflow(step_count: usize) -> Workflow {
        let now = Utc::now();
        let steps = (0..step_count)
            .map(|i| {
                Step::approval(format!("step-{i}"), "Approve", now + Duration::days(7))
                    .with_assignee(UserId::new("owner"))
            })
            .collect();
        Workflow::new(
            TenantId::new("acme"),
            "BIA approval",
            EntityType::BiaAssessment,
            "proc-1",
            steps,
            UserId::new("creator"),
            now,
        )
    }

    #[test]
    fn test_new_workflow_is_pending() {
        let wf = make_workflow(2);
        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert!(!wf.is_terminal());
        assert_eq!(wf.pending_steps().len(), 2);
        assert_eq!(wf.history.len(), 1);
        assert_eq!(wf.history[0].kind, WorkflowEventKind::Started);
    }

    #[test]
    fn test_partial_completion_moves_to_in_progress() {
        let mut wf = make_workflow(2);
        assert!(wf.apply_decision(
            &StepId::new("step-0"),
            StepDecision::Approved,
            UserId::new("owner"),
            Utc::now(),
        ));
        assert_eq!(wf.status, WorkflowStatus::InProgress);
        let step = wf.step(&StepId::new("step-0")).unwrap();
        assert_eq!(step.decision(), Some(StepDecision::Approved));
        assert_eq!(step.completed_by, Some(UserId::new("owner")));
    }

    #[test]
    fn test_completion_is_a_set_condition() {
        let mut wf = make_workflow(2);
        // Second step first; order is not enforced.
        wf.apply_decision(&StepId::new("step-1"), StepDecision::Rejected, UserId::new("a"), Utc::now());
        wf.apply_decision(&StepId::new("step-0"), StepDecision::Approved, UserId::new("b"), Utc::now());
        assert_eq!(wf.status, WorkflowStatus::Completed);
        assert!(wf.is_terminal());
    }

    #[test]
    fn test_unknown_step_is_not_applied() {
        let mut wf = make_workflow(1);
        assert!(!wf.apply_decision(
            &StepId::new("missing"),
            StepDecision::Approved,
            UserId::new("a"),
            Utc::now(),
        ));
        assert_eq!(wf.status, WorkflowStatus::Pending);
    }

    #[test]
    fn test_cancel_supersedes_open_steps_only() {
        let mut wf = make_workflow(2);
        wf.apply_decision(&StepId::new("step-0"), StepDecision::Approved, UserId::new("a"), Utc::now());
        wf.cancel("campaign withdrawn", Utc::now());

        assert_eq!(wf.status, WorkflowStatus::Cancelled);
        assert_eq!(wf.steps[0].status, StepStatus::Approved);
        assert_eq!(wf.steps[1].status, StepStatus::Cancelled);
    }

    #[test]
    fn test_overdue_is_derived_at_query_time() {
        let wf = make_workflow(1);
        let later = Utc::now() + Duration::days(8);
        assert_eq!(wf.steps[0].status, StepStatus::Pending);
        assert_eq!(wf.steps[0].status_at(later), StepStatus::Overdue);
        assert_eq!(wf.overdue_steps(later).len(), 1);
        assert!(wf.overdue_steps(Utc::now()).is_empty());
    }

    #[test]
    fn test_history_sequence_numbers() {
        let mut wf = make_workflow(1);
        wf.apply_decision(&StepId::new("step-0"), StepDecision::Approved, UserId::new("a"), Utc::now());
        for (i, event) in wf.history.iter().enumerate() {
            assert_eq!(event.sequence, i as u64);
        }
        assert_eq!(wf.history.last().unwrap().kind, WorkflowEventKind::Completed);
    }

    #[test]
    fn test_step_wire_format() {
        let step = Step::approval("s1", "Approve", Utc::now()).with_metadata("campaignId", "c1");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "APPROVAL");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["metadata"]["campaignId"], "c1");
        assert_eq!(
            serde_json::to_value(EntityType::BiaAssessment).unwrap(),
            "bia-assessment"
        );
    }
}

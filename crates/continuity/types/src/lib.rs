//! Domain types for the continuity core.
//!
//! Every record here is tenant-scoped: it carries the [`TenantId`] of the
//! organization that owns it, and stores are expected to key on
//! `(tenant, id)` rather than on the id alone.
//!
//! - [`Workflow`] / [`Step`]: assignable, deadline-bound approval work
//! - [`Campaign`]: a BIA campaign that fans out into one workflow per process
//! - [`PolicyDocument`]: a governance document with a forward-only lifecycle
//! - [`RiskAssessment`] / [`RiskControl`]: inherent risk and its mitigations
//! - [`BusinessProcess`] / [`BiaAssessment`]: records the campaign reads

#![deny(unsafe_code)]

mod campaign;
mod ids;
mod policy;
mod process;
mod risk;
mod workflow;

pub use campaign::{Campaign, CampaignStatus};
pub use ids::{
    BiaAssessmentId, CampaignId, EntityKind, PolicyId, ProcessId, RiskAssessmentId,
    RiskControlId, StepId, TenantId, UserId, WorkflowId,
};
pub use policy::{PolicyDocument, PolicyStatus};
pub use process::{BiaAssessment, BiaAssessmentStatus, BusinessProcess};
pub use risk::{RiskAssessment, RiskControl, RISK_SCALE_MAX, RISK_SCALE_MIN};
pub use workflow::{
    EntityType, Step, StepDecision, StepStatus, StepType, Workflow, WorkflowEvent,
    WorkflowEventKind, WorkflowStatus,
};

pub use continuity_scoring::{
    ApplicationCriteria, Automation, ControlAttributes, ControlType, Documentation,
    Effectiveness,
};

/// Metadata key carrying the originating campaign on campaign steps.
pub const META_CAMPAIGN_ID: &str = "campaignId";

/// Metadata key carrying the target process on campaign steps.
pub const META_PROCESS_ID: &str = "processId";

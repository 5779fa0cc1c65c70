use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use continuity_scoring::ResidualRisk;
use continuity_types::{
    BiaAssessment, BusinessProcess, Campaign, CampaignId, EntityType, PolicyDocument, PolicyId,
    PolicyStatus, ProcessId, RiskAssessment, RiskAssessmentId, RiskControl, RiskControlId,
    TenantId, Workflow, WorkflowId,
};

/// Generic query window for paged reads. A zero limit means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert a new workflow. Fails with `AlreadyExists` if the id is taken.
    async fn insert_workflow(&self, workflow: Workflow) -> StorageResult<()>;

    async fn get_workflow(
        &self,
        tenant: &TenantId,
        id: &WorkflowId,
    ) -> StorageResult<Option<Workflow>>;

    /// Replace a workflow if its stored revision equals `expected_revision`.
    ///
    /// Returns the stored copy with its revision bumped. A stale revision
    /// yields `StaleRevision` and leaves the stored record untouched.
    async fn replace_workflow(
        &self,
        workflow: Workflow,
        expected_revision: u64,
    ) -> StorageResult<Workflow>;

    /// Workflows bound to one business entity, oldest first.
    async fn list_workflows_for_entity(
        &self,
        tenant: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
    ) -> StorageResult<Vec<Workflow>>;
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: Campaign) -> StorageResult<()>;

    async fn get_campaign(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
    ) -> StorageResult<Option<Campaign>>;

    /// List campaigns newest-first.
    async fn list_campaigns(
        &self,
        tenant: &TenantId,
        window: QueryWindow,
    ) -> StorageResult<Vec<Campaign>>;

    /// Atomically move a DRAFT campaign to ACTIVE and persist its workflows.
    ///
    /// If the campaign is not DRAFT when the write lands, nothing is written
    /// and `StatusMismatch` is returned.
    async fn activate_campaign(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
        workflows: Vec<Workflow>,
        launched_at: DateTime<Utc>,
    ) -> StorageResult<Campaign>;

    /// Overwrite the cached completed count.
    async fn set_completed_count(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
        completed: u32,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Campaign>;
}

#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn upsert_process(&self, process: BusinessProcess) -> StorageResult<()>;

    async fn get_process(
        &self,
        tenant: &TenantId,
        id: &ProcessId,
    ) -> StorageResult<Option<BusinessProcess>>;

    /// Returns whether a record was removed.
    async fn delete_process(&self, tenant: &TenantId, id: &ProcessId) -> StorageResult<bool>;
}

#[async_trait]
pub trait BiaAssessmentStore: Send + Sync {
    /// Store the current assessment of a process within one campaign.
    ///
    /// A record already held for the same process and campaign is replaced
    /// and keeps its id. Returns the stored copy.
    async fn upsert_bia_assessment(&self, assessment: BiaAssessment)
        -> StorageResult<BiaAssessment>;

    /// Assessments filed under `campaign_id` for any of `processes`
    async fn list_bia_assessments_for_campaign(
        &self,
        tenant: &TenantId,
        campaign_id: &CampaignId,
        processes: &[ProcessId],
    ) -> StorageResult<Vec<BiaAssessment>>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn insert_policy(&self, policy: PolicyDocument) -> StorageResult<()>;

    async fn get_policy(
        &self,
        tenant: &TenantId,
        id: &PolicyId,
    ) -> StorageResult<Option<PolicyDocument>>;

    /// Persist a policy only if the stored status is still `expected_from`.
    async fn save_policy(
        &self,
        policy: PolicyDocument,
        expected_from: PolicyStatus,
    ) -> StorageResult<()>;
}

#[async_trait]
pub trait RiskStore: Send + Sync {
    async fn insert_risk_assessment(&self, assessment: RiskAssessment) -> StorageResult<()>;

    async fn get_risk_assessment(
        &self,
        tenant: &TenantId,
        id: &RiskAssessmentId,
    ) -> StorageResult<Option<RiskAssessment>>;

    /// Overwrite the residual axes; inherent values are never touched.
    async fn update_residual(
        &self,
        tenant: &TenantId,
        id: &RiskAssessmentId,
        residual: ResidualRisk,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<RiskAssessment>;

    async fn insert_control(&self, control: RiskControl) -> StorageResult<()>;

    async fn get_control(
        &self,
        tenant: &TenantId,
        id: &RiskControlId,
    ) -> StorageResult<Option<RiskControl>>;

    async fn replace_control(&self, control: RiskControl) -> StorageResult<()>;

    /// Remove a control, returning it if it existed.
    async fn delete_control(
        &self,
        tenant: &TenantId,
        id: &RiskControlId,
    ) -> StorageResult<Option<RiskControl>>;

    /// Controls attached to one assessment, oldest first.
    async fn list_controls(
        &self,
        tenant: &TenantId,
        assessment: &RiskAssessmentId,
    ) -> StorageResult<Vec<RiskControl>>;
}

/// Unified storage bundle used by the engines.
pub trait ContinuityStorage:
    WorkflowStore
    + CampaignStore
    + ProcessStore
    + BiaAssessmentStore
    + PolicyStore
    + RiskStore
    + Send
    + Sync
{
}

impl<T> ContinuityStorage for T where
    T: WorkflowStore
        + CampaignStore
        + ProcessStore
        + BiaAssessmentStore
        + PolicyStore
        + RiskStore
        + Send
        + Sync
{
}

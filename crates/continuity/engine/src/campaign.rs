//! Campaign Orchestrator: batch launch of BIA approval workflows
//!
//! Launching a DRAFT campaign creates one single-step approval workflow
//! per target process that still exists, then flips the campaign to
//! ACTIVE. The flip and the workflow inserts land in one store call that
//! re-checks DRAFT, so two concurrent launches cannot both succeed.

use crate::workflow::{NewWorkflow, WorkflowEngine};
use crate::{ContinuityError, ContinuityResult, SharedStorage};
use chrono::{DateTime, Utc};
use continuity_storage::QueryWindow;
use continuity_types::{
    Campaign, CampaignId, CampaignStatus, EntityKind, EntityType, ProcessId, Step, TenantId,
    UserId, META_CAMPAIGN_ID, META_PROCESS_ID,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Step id used on every campaign-generated workflow
pub const BIA_APPROVAL_STEP: &str = "bia-approval";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub target_processes: Vec<ProcessId>,
}

/// Result of a launch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOutcome {
    pub workflows_created: usize,
    pub campaign: Campaign,
}

#[derive(Clone)]
pub struct CampaignOrchestrator {
    storage: SharedStorage,
    workflows: WorkflowEngine,
}

impl CampaignOrchestrator {
    pub fn new(storage: SharedStorage, workflows: WorkflowEngine) -> Self {
        Self { storage, workflows }
    }

    /// Create a DRAFT campaign. `total_count` is the raw target count.
    pub async fn create(
        &self,
        tenant: &TenantId,
        user: &UserId,
        request: NewCampaign,
    ) -> ContinuityResult<Campaign> {
        if request.name.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::Campaign,
                "",
                "campaign name must not be blank",
            ));
        }

        let mut campaign = Campaign::draft(
            tenant.clone(),
            request.name,
            request.deadline,
            request.target_processes,
            user.clone(),
            Utc::now(),
        );
        if let Some(description) = request.description {
            campaign = campaign.with_description(description);
        }

        self.storage
            .insert_campaign(campaign.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Campaign, &campaign.id, e))?;

        tracing::info!(
            tenant = %tenant,
            campaign_id = %campaign.id,
            targets = campaign.total_count,
            "Campaign created"
        );
        Ok(campaign)
    }

    /// Fan a DRAFT campaign out into approval workflows and activate it.
    ///
    /// Target ids that no longer resolve are skipped. A campaign whose
    /// targets all vanished still activates with zero workflows.
    pub async fn launch(
        &self,
        tenant: &TenantId,
        campaign_id: &CampaignId,
        user: &UserId,
    ) -> ContinuityResult<LaunchOutcome> {
        let campaign = self.load(tenant, campaign_id).await?;
        if campaign.status != CampaignStatus::Draft {
            return Err(ContinuityError::invalid_state(
                EntityKind::Campaign,
                campaign_id,
                format!("campaign is {}, only DRAFT can be launched", campaign.status.as_str()),
            ));
        }

        let now = Utc::now();
        if campaign.deadline < now {
            return Err(ContinuityError::validation(
                EntityKind::Campaign,
                campaign_id,
                "campaign deadline has already passed",
            ));
        }

        let mut workflows = Vec::with_capacity(campaign.target_processes.len());
        for process_id in &campaign.target_processes {
            let Some(process) = self.storage.get_process(tenant, process_id).await? else {
                tracing::debug!(
                    campaign_id = %campaign_id,
                    process_id = %process_id,
                    "Skipping target that no longer resolves"
                );
                continue;
            };

            let assignee = process
                .responsible_person
                .clone()
                .unwrap_or_else(|| user.clone());
            let step = Step::approval(
                BIA_APPROVAL_STEP,
                format!("Approve BIA for {}", process.name),
                campaign.deadline,
            )
            .with_assignee(assignee)
            .with_metadata(META_CAMPAIGN_ID, campaign_id.as_str())
            .with_metadata(META_PROCESS_ID, process_id.as_str());

            let workflow = self.workflows.prepare_workflow(
                tenant,
                NewWorkflow {
                    name: format!("{}: {}", campaign.name, process.name),
                    entity_type: EntityType::BiaAssessment,
                    entity_id: process_id.to_string(),
                    steps: vec![step],
                },
                user,
                now,
            )?;
            workflows.push(workflow);
        }

        let workflows_created = workflows.len();
        let campaign = self
            .storage
            .activate_campaign(tenant, campaign_id, workflows, now)
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Campaign, campaign_id, e))?;

        tracing::info!(
            tenant = %tenant,
            campaign_id = %campaign_id,
            workflows_created,
            skipped = campaign.target_processes.len() - workflows_created,
            "Campaign launched"
        );
        Ok(LaunchOutcome {
            workflows_created,
            campaign,
        })
    }

    /// Recount target processes whose BIA for this campaign is submitted or
    /// approved.
    ///
    /// The count is recomputed from scratch on every call. Assessments filed
    /// under other campaigns do not count.
    pub async fn update_progress(
        &self,
        tenant: &TenantId,
        campaign_id: &CampaignId,
    ) -> ContinuityResult<Campaign> {
        let campaign = self.load(tenant, campaign_id).await?;
        let assessments = self
            .storage
            .list_bia_assessments_for_campaign(tenant, campaign_id, &campaign.target_processes)
            .await?;

        let finished: HashSet<&ProcessId> = assessments
            .iter()
            .filter(|a| a.status.is_finished())
            .map(|a| &a.process_id)
            .collect();
        let completed = u32::try_from(finished.len()).unwrap_or(u32::MAX);

        let updated = self
            .storage
            .set_completed_count(tenant, campaign_id, completed, Utc::now())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Campaign, campaign_id, e))?;

        tracing::debug!(
            campaign_id = %campaign_id,
            completed,
            total = updated.total_count,
            "Campaign progress updated"
        );
        Ok(updated)
    }

    pub async fn get(&self, tenant: &TenantId, campaign_id: &CampaignId) -> ContinuityResult<Campaign> {
        self.load(tenant, campaign_id).await
    }

    /// Campaigns newest-first
    pub async fn list(&self, tenant: &TenantId, window: QueryWindow) -> ContinuityResult<Vec<Campaign>> {
        Ok(self.storage.list_campaigns(tenant, window).await?)
    }

    async fn load(&self, tenant: &TenantId, campaign_id: &CampaignId) -> ContinuityResult<Campaign> {
        self.storage
            .get_campaign(tenant, campaign_id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::Campaign, campaign_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use chrono::Duration;
    use continuity_storage::{BiaAssessmentStore, InMemoryContinuityStorage, ProcessStore};
    use continuity_types::{BiaAssessment, BiaAssessmentStatus, BusinessProcess};
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryContinuityStorage>, CampaignOrchestrator) {
        let storage = Arc::new(InMemoryContinuityStorage::new());
        let shared: SharedStorage = storage.clone();
        let workflows = WorkflowEngine::new(shared.clone(), EngineConfig::default());
        (storage, CampaignOrchestrator::new(shared, workflows))
    }

    fn acme() -> TenantId {
        TenantId::new("acme")
    }

    fn request(targets: &[&str]) -> NewCampaign {
        NewCampaign {
            name: "2026 BIA refresh".into(),
            description: None,
            deadline: Utc::now() + Duration::days(30),
            target_processes: targets.iter().map(|t| ProcessId::new(*t)).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (_, campaigns) = setup();
        let mut req = request(&["p1"]);
        req.name = "   ".into();
        let err = campaigns
            .create(&acme(), &UserId::new("u1"), req)
            .await
            .unwrap_err();
        assert!(matches!(err, ContinuityError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_launch_assigns_responsible_person_or_launcher() {
        let (storage, campaigns) = setup();
        storage
            .upsert_process(
                BusinessProcess::new(acme(), ProcessId::new("p1"), "Payroll")
                    .with_responsible(UserId::new("owner-1")),
            )
            .await
            .unwrap();
        storage
            .upsert_process(BusinessProcess::new(acme(), ProcessId::new("p2"), "Billing"))
            .await
            .unwrap();

        let launcher = UserId::new("launcher");
        let campaign = campaigns
            .create(&acme(), &launcher, request(&["p1", "p2"]))
            .await
            .unwrap();
        let outcome = campaigns.launch(&acme(), &campaign.id, &launcher).await.unwrap();
        assert_eq!(outcome.workflows_created, 2);

        let wf = campaigns
            .workflows
            .workflows_for_entity(&acme(), EntityType::BiaAssessment, "p1")
            .await
            .unwrap()
            .remove(0);
        let step = &wf.steps[0];
        assert!(step.assigned_to.contains(&UserId::new("owner-1")));
        assert_eq!(step.due_date, campaign.deadline);
        assert_eq!(step.metadata[META_CAMPAIGN_ID], campaign.id.as_str());
        assert_eq!(step.metadata[META_PROCESS_ID], "p1");

        let wf = campaigns
            .workflows
            .workflows_for_entity(&acme(), EntityType::BiaAssessment, "p2")
            .await
            .unwrap()
            .remove(0);
        assert!(wf.steps[0].assigned_to.contains(&launcher));
    }

    #[tokio::test]
    async fn test_launch_twice_is_invalid_state() {
        let (_, campaigns) = setup();
        let user = UserId::new("u1");
        let campaign = campaigns.create(&acme(), &user, request(&[])).await.unwrap();
        campaigns.launch(&acme(), &campaign.id, &user).await.unwrap();

        let err = campaigns.launch(&acme(), &campaign.id, &user).await.unwrap_err();
        assert!(matches!(err, ContinuityError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_update_progress_counts_distinct_finished_processes() {
        let (storage, campaigns) = setup();
        let user = UserId::new("u1");
        let campaign = campaigns
            .create(&acme(), &user, request(&["p1", "p2", "p3"]))
            .await
            .unwrap();

        for (process, status) in [
            ("p1", BiaAssessmentStatus::Submitted),
            ("p1", BiaAssessmentStatus::Approved),
            ("p2", BiaAssessmentStatus::InProgress),
            ("p9", BiaAssessmentStatus::Approved),
        ] {
            storage
                .upsert_bia_assessment(
                    BiaAssessment::new(acme(), ProcessId::new(process), status)
                        .with_campaign(campaign.id.clone()),
                )
                .await
                .unwrap();
        }

        let first = campaigns.update_progress(&acme(), &campaign.id).await.unwrap();
        let second = campaigns.update_progress(&acme(), &campaign.id).await.unwrap();
        assert_eq!(first.completed_count, 1);
        assert_eq!(second.completed_count, 1);
        assert_eq!(second.total_count, 3);
    }
}

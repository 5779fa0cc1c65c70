//! In-memory reference implementation of the continuity storage traits.
//!
//! Every map is keyed by `(tenant, id)`. Multi-record writes take their
//! locks in a fixed order (campaigns, then workflows) so concurrent
//! launches cannot deadlock.

use crate::traits::{
    BiaAssessmentStore, CampaignStore, PolicyStore, ProcessStore, QueryWindow, RiskStore,
    WorkflowStore,
};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use continuity_scoring::ResidualRisk;
use continuity_types::{
    BiaAssessment, BiaAssessmentId, BusinessProcess, Campaign, CampaignId, CampaignStatus,
    EntityKind, EntityType, PolicyDocument, PolicyId, PolicyStatus, ProcessId, RiskAssessment,
    RiskAssessmentId, RiskControl, RiskControlId, TenantId, Workflow, WorkflowId,
};
use std::collections::HashMap;
use std::sync::RwLock;

type Keyed<I, V> = RwLock<HashMap<(TenantId, I), V>>;

/// In-memory continuity storage adapter.
#[derive(Default)]
pub struct InMemoryContinuityStorage {
    workflows: Keyed<WorkflowId, Workflow>,
    campaigns: Keyed<CampaignId, Campaign>,
    processes: Keyed<ProcessId, BusinessProcess>,
    bia_assessments: Keyed<BiaAssessmentId, BiaAssessment>,
    policies: Keyed<PolicyId, PolicyDocument>,
    risk_assessments: Keyed<RiskAssessmentId, RiskAssessment>,
    controls: Keyed<RiskControlId, RiskControl>,
}

impl InMemoryContinuityStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(name: &str) -> StorageError {
    StorageError::Backend(format!("{name} lock poisoned"))
}

fn key<I: Clone>(tenant: &TenantId, id: &I) -> (TenantId, I) {
    (tenant.clone(), id.clone())
}

#[async_trait]
impl WorkflowStore for InMemoryContinuityStorage {
    async fn insert_workflow(&self, workflow: Workflow) -> StorageResult<()> {
        let mut guard = self.workflows.write().map_err(|_| poisoned("workflows"))?;
        let k = key(&workflow.tenant_id, &workflow.id);
        if guard.contains_key(&k) {
            return Err(StorageError::already_exists(EntityKind::Workflow, &workflow.id));
        }
        guard.insert(k, workflow);
        Ok(())
    }

    async fn get_workflow(
        &self,
        tenant: &TenantId,
        id: &WorkflowId,
    ) -> StorageResult<Option<Workflow>> {
        let guard = self.workflows.read().map_err(|_| poisoned("workflows"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn replace_workflow(
        &self,
        mut workflow: Workflow,
        expected_revision: u64,
    ) -> StorageResult<Workflow> {
        let mut guard = self.workflows.write().map_err(|_| poisoned("workflows"))?;
        let stored = guard
            .get_mut(&key(&workflow.tenant_id, &workflow.id))
            .ok_or_else(|| StorageError::not_found(EntityKind::Workflow, &workflow.id))?;

        if stored.revision != expected_revision {
            return Err(StorageError::StaleRevision {
                id: workflow.id.to_string(),
                expected: expected_revision,
                found: stored.revision,
            });
        }

        workflow.revision = expected_revision + 1;
        *stored = workflow.clone();
        Ok(workflow)
    }

    async fn list_workflows_for_entity(
        &self,
        tenant: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
    ) -> StorageResult<Vec<Workflow>> {
        let guard = self.workflows.read().map_err(|_| poisoned("workflows"))?;
        let mut values = guard
            .iter()
            .filter(|((t, _), wf)| {
                t == tenant && wf.entity_type == entity_type && wf.entity_id == entity_id
            })
            .map(|(_, wf)| wf.clone())
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(values)
    }
}

#[async_trait]
impl CampaignStore for InMemoryContinuityStorage {
    async fn insert_campaign(&self, campaign: Campaign) -> StorageResult<()> {
        let mut guard = self.campaigns.write().map_err(|_| poisoned("campaigns"))?;
        let k = key(&campaign.tenant_id, &campaign.id);
        if guard.contains_key(&k) {
            return Err(StorageError::already_exists(EntityKind::Campaign, &campaign.id));
        }
        guard.insert(k, campaign);
        Ok(())
    }

    async fn get_campaign(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
    ) -> StorageResult<Option<Campaign>> {
        let guard = self.campaigns.read().map_err(|_| poisoned("campaigns"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn list_campaigns(
        &self,
        tenant: &TenantId,
        window: QueryWindow,
    ) -> StorageResult<Vec<Campaign>> {
        let guard = self.campaigns.read().map_err(|_| poisoned("campaigns"))?;
        let mut values = guard
            .iter()
            .filter(|((t, _), _)| t == tenant)
            .map(|(_, c)| c.clone())
            .collect::<Vec<_>>();
        values.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apply_window(values, window))
    }

    async fn activate_campaign(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
        workflows: Vec<Workflow>,
        launched_at: DateTime<Utc>,
    ) -> StorageResult<Campaign> {
        let mut campaigns = self.campaigns.write().map_err(|_| poisoned("campaigns"))?;
        let campaign = campaigns
            .get_mut(&key(tenant, id))
            .ok_or_else(|| StorageError::not_found(EntityKind::Campaign, id))?;

        if campaign.status != CampaignStatus::Draft {
            return Err(StorageError::StatusMismatch {
                kind: EntityKind::Campaign,
                id: id.to_string(),
                expected: CampaignStatus::Draft.as_str(),
                found: campaign.status.as_str(),
            });
        }

        let mut store = self.workflows.write().map_err(|_| poisoned("workflows"))?;
        if let Some(dup) = workflows
            .iter()
            .find(|wf| store.contains_key(&key(&wf.tenant_id, &wf.id)))
        {
            return Err(StorageError::already_exists(EntityKind::Workflow, &dup.id));
        }
        if let Some(foreign) = workflows.iter().find(|wf| &wf.tenant_id != tenant) {
            return Err(StorageError::InvalidInput(format!(
                "workflow {} belongs to another tenant",
                foreign.id
            )));
        }

        for workflow in workflows {
            store.insert(key(&workflow.tenant_id, &workflow.id), workflow);
        }
        campaign.status = CampaignStatus::Active;
        campaign.launched_at = Some(launched_at);
        campaign.updated_at = launched_at;
        Ok(campaign.clone())
    }

    async fn set_completed_count(
        &self,
        tenant: &TenantId,
        id: &CampaignId,
        completed: u32,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Campaign> {
        let mut guard = self.campaigns.write().map_err(|_| poisoned("campaigns"))?;
        let campaign = guard
            .get_mut(&key(tenant, id))
            .ok_or_else(|| StorageError::not_found(EntityKind::Campaign, id))?;
        campaign.completed_count = completed;
        campaign.updated_at = updated_at;
        Ok(campaign.clone())
    }
}

#[async_trait]
impl ProcessStore for InMemoryContinuityStorage {
    async fn upsert_process(&self, process: BusinessProcess) -> StorageResult<()> {
        let mut guard = self.processes.write().map_err(|_| poisoned("processes"))?;
        guard.insert(key(&process.tenant_id, &process.id), process);
        Ok(())
    }

    async fn get_process(
        &self,
        tenant: &TenantId,
        id: &ProcessId,
    ) -> StorageResult<Option<BusinessProcess>> {
        let guard = self.processes.read().map_err(|_| poisoned("processes"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn delete_process(&self, tenant: &TenantId, id: &ProcessId) -> StorageResult<bool> {
        let mut guard = self.processes.write().map_err(|_| poisoned("processes"))?;
        Ok(guard.remove(&key(tenant, id)).is_some())
    }
}

#[async_trait]
impl BiaAssessmentStore for InMemoryContinuityStorage {
    async fn upsert_bia_assessment(
        &self,
        mut assessment: BiaAssessment,
    ) -> StorageResult<BiaAssessment> {
        let mut guard = self
            .bia_assessments
            .write()
            .map_err(|_| poisoned("bia assessments"))?;

        let existing = guard
            .iter()
            .find(|((t, _), a)| {
                t == &assessment.tenant_id
                    && a.process_id == assessment.process_id
                    && a.campaign_id == assessment.campaign_id
            })
            .map(|((_, id), _)| id.clone());
        if let Some(id) = existing {
            assessment.id = id;
        }

        guard.insert(key(&assessment.tenant_id, &assessment.id), assessment.clone());
        Ok(assessment)
    }

    async fn list_bia_assessments_for_campaign(
        &self,
        tenant: &TenantId,
        campaign_id: &CampaignId,
        processes: &[ProcessId],
    ) -> StorageResult<Vec<BiaAssessment>> {
        let guard = self
            .bia_assessments
            .read()
            .map_err(|_| poisoned("bia assessments"))?;
        Ok(guard
            .iter()
            .filter(|((t, _), a)| {
                t == tenant
                    && a.campaign_id.as_ref() == Some(campaign_id)
                    && processes.contains(&a.process_id)
            })
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl PolicyStore for InMemoryContinuityStorage {
    async fn insert_policy(&self, policy: PolicyDocument) -> StorageResult<()> {
        let mut guard = self.policies.write().map_err(|_| poisoned("policies"))?;
        let k = key(&policy.tenant_id, &policy.id);
        if guard.contains_key(&k) {
            return Err(StorageError::already_exists(EntityKind::Policy, &policy.id));
        }
        guard.insert(k, policy);
        Ok(())
    }

    async fn get_policy(
        &self,
        tenant: &TenantId,
        id: &PolicyId,
    ) -> StorageResult<Option<PolicyDocument>> {
        let guard = self.policies.read().map_err(|_| poisoned("policies"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn save_policy(
        &self,
        policy: PolicyDocument,
        expected_from: PolicyStatus,
    ) -> StorageResult<()> {
        let mut guard = self.policies.write().map_err(|_| poisoned("policies"))?;
        let stored = guard
            .get_mut(&key(&policy.tenant_id, &policy.id))
            .ok_or_else(|| StorageError::not_found(EntityKind::Policy, &policy.id))?;

        if stored.status != expected_from {
            return Err(StorageError::StatusMismatch {
                kind: EntityKind::Policy,
                id: policy.id.to_string(),
                expected: expected_from.as_str(),
                found: stored.status.as_str(),
            });
        }

        *stored = policy;
        Ok(())
    }
}

#[async_trait]
impl RiskStore for InMemoryContinuityStorage {
    async fn insert_risk_assessment(&self, assessment: RiskAssessment) -> StorageResult<()> {
        let mut guard = self
            .risk_assessments
            .write()
            .map_err(|_| poisoned("risk assessments"))?;
        let k = key(&assessment.tenant_id, &assessment.id);
        if guard.contains_key(&k) {
            return Err(StorageError::already_exists(
                EntityKind::RiskAssessment,
                &assessment.id,
            ));
        }
        guard.insert(k, assessment);
        Ok(())
    }

    async fn get_risk_assessment(
        &self,
        tenant: &TenantId,
        id: &RiskAssessmentId,
    ) -> StorageResult<Option<RiskAssessment>> {
        let guard = self
            .risk_assessments
            .read()
            .map_err(|_| poisoned("risk assessments"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn update_residual(
        &self,
        tenant: &TenantId,
        id: &RiskAssessmentId,
        residual: ResidualRisk,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<RiskAssessment> {
        let mut guard = self
            .risk_assessments
            .write()
            .map_err(|_| poisoned("risk assessments"))?;
        let assessment = guard.get_mut(&key(tenant, id)).ok_or_else(|| {
            StorageError::not_found(EntityKind::RiskAssessment, id)
        })?;
        assessment.set_residual(residual, updated_at);
        Ok(assessment.clone())
    }

    async fn insert_control(&self, control: RiskControl) -> StorageResult<()> {
        let mut guard = self.controls.write().map_err(|_| poisoned("controls"))?;
        let k = key(&control.tenant_id, &control.id);
        if guard.contains_key(&k) {
            return Err(StorageError::already_exists(EntityKind::RiskControl, &control.id));
        }
        guard.insert(k, control);
        Ok(())
    }

    async fn get_control(
        &self,
        tenant: &TenantId,
        id: &RiskControlId,
    ) -> StorageResult<Option<RiskControl>> {
        let guard = self.controls.read().map_err(|_| poisoned("controls"))?;
        Ok(guard.get(&key(tenant, id)).cloned())
    }

    async fn replace_control(&self, control: RiskControl) -> StorageResult<()> {
        let mut guard = self.controls.write().map_err(|_| poisoned("controls"))?;
        let stored = guard
            .get_mut(&key(&control.tenant_id, &control.id))
            .ok_or_else(|| StorageError::not_found(EntityKind::RiskControl, &control.id))?;
        *stored = control;
        Ok(())
    }

    async fn delete_control(
        &self,
        tenant: &TenantId,
        id: &RiskControlId,
    ) -> StorageResult<Option<RiskControl>> {
        let mut guard = self.controls.write().map_err(|_| poisoned("controls"))?;
        Ok(guard.remove(&key(tenant, id)))
    }

    async fn list_controls(
        &self,
        tenant: &TenantId,
        assessment: &RiskAssessmentId,
    ) -> StorageResult<Vec<RiskControl>> {
        let guard = self.controls.read().map_err(|_| poisoned("controls"))?;
        let mut values = guard
            .iter()
            .filter(|((t, _), c)| t == tenant && &c.risk_assessment_id == assessment)
            .map(|(_, c)| c.clone())
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(values)
    }
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_types::{BiaAssessmentStatus, Step, UserId};

    fn tenant(name: &str) -> TenantId {
        TenantId::new(name)
    }

    fn workflow(tenant: &TenantId, entity_id: &str) -> Workflow {
        Workflow::new(
            tenant.clone(),
            "BIA approval",
            EntityType::BiaAssessment,
            entity_id,
            vec![Step::approval("review", "Review", Utc::now())],
            UserId::new("u1"),
            Utc::now(),
        )
    }

    fn campaign(tenant: &TenantId) -> Campaign {
        Campaign::draft(
            tenant.clone(),
            "Q3",
            Utc::now(),
            vec![ProcessId::new("p1")],
            UserId::new("u1"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn replace_workflow_rejects_stale_revision() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let wf = workflow(&acme, "p1");
        storage.insert_workflow(wf.clone()).await.unwrap();

        let stored = storage.replace_workflow(wf.clone(), 0).await.unwrap();
        assert_eq!(stored.revision, 1);

        let err = storage.replace_workflow(wf, 0).await.unwrap_err();
        assert!(matches!(err, StorageError::StaleRevision { .. }));
    }

    #[tokio::test]
    async fn reads_are_tenant_scoped() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let globex = tenant("globex");
        let wf = workflow(&acme, "p1");
        storage.insert_workflow(wf.clone()).await.unwrap();

        assert!(storage.get_workflow(&acme, &wf.id).await.unwrap().is_some());
        assert!(storage.get_workflow(&globex, &wf.id).await.unwrap().is_none());
        assert!(storage
            .list_workflows_for_entity(&globex, EntityType::BiaAssessment, "p1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn activate_campaign_is_single_shot() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let c = campaign(&acme);
        storage.insert_campaign(c.clone()).await.unwrap();

        let activated = storage
            .activate_campaign(&acme, &c.id, vec![workflow(&acme, "p1")], Utc::now())
            .await
            .unwrap();
        assert_eq!(activated.status, CampaignStatus::Active);
        assert!(activated.launched_at.is_some());

        let err = storage
            .activate_campaign(&acme, &c.id, vec![workflow(&acme, "p1")], Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::StatusMismatch { .. }));

        let workflows = storage
            .list_workflows_for_entity(&acme, EntityType::BiaAssessment, "p1")
            .await
            .unwrap();
        assert_eq!(workflows.len(), 1);
    }

    #[tokio::test]
    async fn activate_campaign_writes_nothing_on_foreign_workflow() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let c = campaign(&acme);
        storage.insert_campaign(c.clone()).await.unwrap();

        let err = storage
            .activate_campaign(
                &acme,
                &c.id,
                vec![workflow(&acme, "p1"), workflow(&tenant("globex"), "p2")],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));

        let stored = storage.get_campaign(&acme, &c.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Draft);
        assert!(storage
            .list_workflows_for_entity(&acme, EntityType::BiaAssessment, "p1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn save_policy_checks_expected_status() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let mut policy = PolicyDocument::draft(acme.clone(), "BCP", "body", "1.0", Utc::now());
        storage.insert_policy(policy.clone()).await.unwrap();

        policy.status = PolicyStatus::Review;
        storage
            .save_policy(policy.clone(), PolicyStatus::Draft)
            .await
            .unwrap();

        policy.status = PolicyStatus::Approved;
        let err = storage
            .save_policy(policy, PolicyStatus::Draft)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::StatusMismatch { .. }));
    }

    #[tokio::test]
    async fn list_campaigns_applies_window() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        for _ in 0..3 {
            storage.insert_campaign(campaign(&acme)).await.unwrap();
        }
        storage
            .insert_campaign(campaign(&tenant("globex")))
            .await
            .unwrap();

        let all = storage
            .list_campaigns(&acme, QueryWindow::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let page = storage
            .list_campaigns(&acme, QueryWindow { limit: 2, offset: 2 })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn bia_assessments_are_kept_per_process_and_campaign() {
        let storage = InMemoryContinuityStorage::new();
        let acme = tenant("acme");
        let q3 = CampaignId::new("q3");
        let q4 = CampaignId::new("q4");
        let record = |campaign: &CampaignId, status| {
            BiaAssessment::new(acme.clone(), ProcessId::new("p1"), status)
                .with_campaign(campaign.clone())
        };

        let first = storage
            .upsert_bia_assessment(record(&q3, BiaAssessmentStatus::Submitted))
            .await
            .unwrap();
        let reopened = storage
            .upsert_bia_assessment(record(&q3, BiaAssessmentStatus::Draft))
            .await
            .unwrap();
        assert_eq!(reopened.id, first.id);

        storage
            .upsert_bia_assessment(record(&q4, BiaAssessmentStatus::Approved))
            .await
            .unwrap();

        let processes = [ProcessId::new("p1")];
        let in_q3 = storage
            .list_bia_assessments_for_campaign(&acme, &q3, &processes)
            .await
            .unwrap();
        assert_eq!(in_q3.len(), 1);
        assert_eq!(in_q3[0].status, BiaAssessmentStatus::Draft);

        let in_q4 = storage
            .list_bia_assessments_for_campaign(&acme, &q4, &processes)
            .await
            .unwrap();
        assert_eq!(in_q4.len(), 1);
        assert_eq!(in_q4[0].status, BiaAssessmentStatus::Approved);
    }
}

//! Business processes and BIA assessments owned by the surrounding CRUD
//! layer. The campaign orchestrator only reads them; this directory is the
//! minimal write path that keeps them tenant-scoped and validated.

use crate::{ContinuityError, ContinuityResult, SharedStorage};
use continuity_types::{
    BiaAssessment, BiaAssessmentStatus, BusinessProcess, CampaignId, EntityKind, ProcessId,
    TenantId, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProcess {
    #[serde(default)]
    pub id: Option<ProcessId>,
    pub name: String,
    #[serde(default)]
    pub responsible_person: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBiaAssessment {
    pub process_id: ProcessId,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    pub status: BiaAssessmentStatus,
}

#[derive(Clone)]
pub struct ProcessDirectory {
    storage: SharedStorage,
}

impl ProcessDirectory {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub async fn register_process(
        &self,
        tenant: &TenantId,
        request: NewProcess,
    ) -> ContinuityResult<BusinessProcess> {
        let id = request.id.unwrap_or_else(ProcessId::generate);
        if request.name.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::Process,
                &id,
                "process name must not be blank",
            ));
        }

        let mut process = BusinessProcess::new(tenant.clone(), id, request.name);
        process.responsible_person = request.responsible_person;
        self.storage.upsert_process(process.clone()).await?;
        tracing::debug!(tenant = %tenant, process_id = %process.id, "Process registered");
        Ok(process)
    }

    /// Remove a process. Campaigns still listing it will skip it on launch.
    pub async fn remove_process(&self, tenant: &TenantId, id: &ProcessId) -> ContinuityResult<()> {
        if !self.storage.delete_process(tenant, id).await? {
            return Err(ContinuityError::not_found(EntityKind::Process, id));
        }
        tracing::debug!(tenant = %tenant, process_id = %id, "Process removed");
        Ok(())
    }

    /// Record the current BIA status of a process, replacing any earlier
    /// record for the same process and campaign.
    pub async fn record_bia_assessment(
        &self,
        tenant: &TenantId,
        request: NewBiaAssessment,
    ) -> ContinuityResult<BiaAssessment> {
        if self
            .storage
            .get_process(tenant, &request.process_id)
            .await?
            .is_none()
        {
            return Err(ContinuityError::not_found(EntityKind::Process, &request.process_id));
        }

        let mut assessment = BiaAssessment::new(tenant.clone(), request.process_id, request.status);
        if let Some(campaign_id) = request.campaign_id {
            assessment = assessment.with_campaign(campaign_id);
        }
        let assessment = self.storage.upsert_bia_assessment(assessment).await?;
        tracing::debug!(
            tenant = %tenant,
            process_id = %assessment.process_id,
            status = ?assessment.status,
            "BIA assessment recorded"
        );
        Ok(assessment)
    }
}

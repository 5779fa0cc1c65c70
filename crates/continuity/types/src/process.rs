//! Business processes and their BIA assessments
//!
//! These records are maintained by the surrounding CRUD layer; the core
//! only reads them when launching campaigns and recomputing progress.

use crate::{BiaAssessmentId, CampaignId, ProcessId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A business process subject to impact analysis
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProcess {
    pub id: ProcessId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Designated owner who approves the process's BIA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<UserId>,
}

impl BusinessProcess {
    pub fn new(tenant_id: TenantId, id: ProcessId, name: impl Into<String>) -> Self {
        Self {
            id,
            tenant_id,
            name: name.into(),
            responsible_person: None,
        }
    }

    pub fn with_responsible(mut self, user: UserId) -> Self {
        self.responsible_person = Some(user);
        self
    }
}

/// The impact analysis of one process
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiaAssessment {
    pub id: BiaAssessmentId,
    pub tenant_id: TenantId,
    pub process_id: ProcessId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    pub status: BiaAssessmentStatus,
    pub updated_at: DateTime<Utc>,
}

impl BiaAssessment {
    pub fn new(tenant_id: TenantId, process_id: ProcessId, status: BiaAssessmentStatus) -> Self {
        Self {
            id: BiaAssessmentId::generate(),
            tenant_id,
            process_id,
            campaign_id: None,
            status,
            updated_at: Utc::now(),
        }
    }

    pub fn with_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiaAssessmentStatus {
    #[default]
    Draft,
    InProgress,
    Submitted,
    Approved,
}

impl BiaAssessmentStatus {
    /// Submitted or approved assessments count toward campaign progress
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Submitted | Self::Approved)
    }
}

//! BIA campaigns

use crate::{CampaignId, ProcessId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A batch trigger that fans out into one workflow per targeted process
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub deadline: DateTime<Utc>,
    /// Targets in caller order; duplicates are not removed
    pub target_processes: Vec<ProcessId>,
    /// Fixed at creation to `target_processes.len()`
    pub total_count: u32,
    /// Recomputed from downstream assessments, never incremented
    pub completed_count: u32,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Create a draft campaign
    pub fn draft(
        tenant_id: TenantId,
        name: impl Into<String>,
        deadline: DateTime<Utc>,
        target_processes: Vec<ProcessId>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        let total_count = u32::try_from(target_processes.len()).unwrap_or(u32::MAX);
        Self {
            id: CampaignId::generate(),
            tenant_id,
            name: name.into(),
            description: None,
            status: CampaignStatus::Draft,
            deadline,
            target_processes,
            total_count,
            completed_count: 0,
            created_by,
            created_at: now,
            updated_at: now,
            launched_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Share of targets with a finished assessment, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        f64::from(self.completed_count) / f64::from(self.total_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Closed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }
}

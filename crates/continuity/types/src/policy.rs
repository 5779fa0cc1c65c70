//! Governance policy documents

use crate::{PolicyId, TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A versioned governance artifact moving through a fixed lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub id: PolicyId,
    pub tenant_id: TenantId,
    pub title: String,
    pub content: String,
    pub version: String,
    pub status: PolicyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyDocument {
    pub fn draft(
        tenant_id: TenantId,
        title: impl Into<String>,
        content: impl Into<String>,
        version: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PolicyId::generate(),
            tenant_id,
            title: title.into(),
            content: content.into(),
            version: version.into(),
            status: PolicyStatus::Draft,
            approved_at: None,
            approved_by: None,
            approval_comments: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Forward-only lifecycle: Draft → Review → Approved → Active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    #[default]
    Draft,
    Review,
    Approved,
    Active,
}

impl PolicyStatus {
    /// The single status this one may advance to
    pub fn next(&self) -> Option<PolicyStatus> {
        match self {
            Self::Draft => Some(Self::Review),
            Self::Review => Some(Self::Approved),
            Self::Approved => Some(Self::Active),
            Self::Active => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Review => "REVIEW",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
        }
    }
}

//! Document Lifecycle Controller for governance policies
//!
//! DRAFT → REVIEW → APPROVED → ACTIVE, forward only. Each transition is
//! written with the expected source status so a concurrent transition
//! surfaces as `InvalidState` instead of being overwritten.

use crate::{ContinuityError, ContinuityResult, SharedStorage};
use chrono::{DateTime, Utc};
use continuity_types::{EntityKind, PolicyDocument, PolicyId, PolicyStatus, TenantId, UserId};
use serde::{Deserialize, Serialize};

const DEFAULT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone)]
pub struct DocumentLifecycle {
    storage: SharedStorage,
}

impl DocumentLifecycle {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, tenant: &TenantId, request: NewPolicy) -> ContinuityResult<PolicyDocument> {
        if request.title.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::Policy,
                "",
                "policy title must not be blank",
            ));
        }
        let version = request
            .version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let policy = PolicyDocument::draft(tenant.clone(), request.title, request.content, version, Utc::now());
        self.storage
            .insert_policy(policy.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Policy, &policy.id, e))?;

        tracing::info!(tenant = %tenant, policy_id = %policy.id, version = %policy.version, "Policy drafted");
        Ok(policy)
    }

    pub async fn submit_for_review(&self, tenant: &TenantId, id: &PolicyId) -> ContinuityResult<PolicyDocument> {
        self.transition(tenant, id, PolicyStatus::Draft, |policy, now| {
            policy.updated_at = now;
        })
        .await
    }

    /// REVIEW → APPROVED, recording who approved and when
    pub async fn approve(
        &self,
        tenant: &TenantId,
        id: &PolicyId,
        approver: &UserId,
        comments: Option<String>,
    ) -> ContinuityResult<PolicyDocument> {
        self.transition(tenant, id, PolicyStatus::Review, |policy, now| {
            policy.approved_at = Some(now);
            policy.approved_by = Some(approver.clone());
            policy.approval_comments = comments.filter(|c| !c.trim().is_empty());
            policy.updated_at = now;
        })
        .await
    }

    /// APPROVED → ACTIVE
    pub async fn publish(&self, tenant: &TenantId, id: &PolicyId) -> ContinuityResult<PolicyDocument> {
        self.transition(tenant, id, PolicyStatus::Approved, |policy, now| {
            policy.published_at = Some(now);
            policy.updated_at = now;
        })
        .await
    }

    pub async fn get(&self, tenant: &TenantId, id: &PolicyId) -> ContinuityResult<PolicyDocument> {
        self.storage
            .get_policy(tenant, id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::Policy, id))
    }

    async fn transition<F>(
        &self,
        tenant: &TenantId,
        id: &PolicyId,
        from: PolicyStatus,
        apply: F,
    ) -> ContinuityResult<PolicyDocument>
    where
        F: FnOnce(&mut PolicyDocument, DateTime<Utc>),
    {
        let mut policy = self.get(tenant, id).await?;
        let Some(to) = from.next() else {
            return Err(ContinuityError::invalid_state(EntityKind::Policy, id, "no further transition"));
        };
        if policy.status != from {
            return Err(ContinuityError::invalid_state(
                EntityKind::Policy,
                id,
                format!(
                    "policy is {}, moving to {} requires {}",
                    policy.status.as_str(),
                    to.as_str(),
                    from.as_str()
                ),
            ));
        }

        apply(&mut policy, Utc::now());
        policy.status = to;
        self.storage
            .save_policy(policy.clone(), from)
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::Policy, id, e))?;

        tracing::info!(
            tenant = %tenant,
            policy_id = %id,
            from = from.as_str(),
            to = to.as_str(),
            "Policy transitioned"
        );
        Ok(policy)
    }
}

//! Risk Treatment Controller
//!
//! Controls are scored on write and the parent assessment's residual risk is
//! recomputed after every control create, update or delete, so the stored
//! residual never lags behind the attached controls.

use crate::{ContinuityError, ContinuityResult, SharedStorage};
use chrono::Utc;
use continuity_scoring::{residual_risk, score_control};
use continuity_types::{
    ControlAttributes, EntityKind, RiskAssessment, RiskAssessmentId, RiskControl, RiskControlId,
    TenantId, RISK_SCALE_MAX, RISK_SCALE_MIN,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRiskAssessment {
    pub title: String,
    pub probability_before: u32,
    pub impact_before: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewControl {
    pub risk_assessment_id: RiskAssessmentId,
    pub description: String,
    #[serde(flatten)]
    pub attributes: ControlAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub attributes: ControlAttributes,
}

#[derive(Clone)]
pub struct RiskTreatment {
    storage: SharedStorage,
}

impl RiskTreatment {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub async fn create_assessment(
        &self,
        tenant: &TenantId,
        request: NewRiskAssessment,
    ) -> ContinuityResult<RiskAssessment> {
        if request.title.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::RiskAssessment,
                "",
                "risk title must not be blank",
            ));
        }
        check_scale("probabilityBefore", request.probability_before)?;
        check_scale("impactBefore", request.impact_before)?;

        let assessment = RiskAssessment::new(
            tenant.clone(),
            request.title,
            request.probability_before,
            request.impact_before,
            Utc::now(),
        );
        self.storage
            .insert_risk_assessment(assessment.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::RiskAssessment, &assessment.id, e))?;

        tracing::info!(
            tenant = %tenant,
            risk_id = %assessment.id,
            score_before = assessment.score_before,
            "Risk assessment created"
        );
        Ok(assessment)
    }

    pub async fn get_assessment(
        &self,
        tenant: &TenantId,
        id: &RiskAssessmentId,
    ) -> ContinuityResult<RiskAssessment> {
        self.storage
            .get_risk_assessment(tenant, id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::RiskAssessment, id))
    }

    /// Score and attach a control, then refresh the residual risk
    pub async fn create_control(&self, tenant: &TenantId, request: NewControl) -> ContinuityResult<RiskControl> {
        if request.description.trim().is_empty() {
            return Err(ContinuityError::validation(
                EntityKind::RiskControl,
                "",
                "control description must not be blank",
            ));
        }
        let assessment = self.get_assessment(tenant, &request.risk_assessment_id).await?;

        let scored = score_control(&request.attributes);
        let control = RiskControl::new(
            tenant.clone(),
            assessment.id.clone(),
            request.description,
            request.attributes,
            scored,
            Utc::now(),
        );
        self.storage
            .insert_control(control.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::RiskControl, &control.id, e))?;

        tracing::info!(
            tenant = %tenant,
            risk_id = %assessment.id,
            control_id = %control.id,
            score = control.score,
            quadrants = control.reduction_quadrants,
            "Risk control created"
        );
        self.calculate_residual_risk(tenant, &assessment.id).await?;
        Ok(control)
    }

    /// Replace a control's attributes and re-score it
    pub async fn update_control(
        &self,
        tenant: &TenantId,
        id: &RiskControlId,
        update: ControlUpdate,
    ) -> ContinuityResult<RiskControl> {
        let mut control = self
            .storage
            .get_control(tenant, id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::RiskControl, id))?;

        if let Some(description) = update.description {
            if description.trim().is_empty() {
                return Err(ContinuityError::validation(
                    EntityKind::RiskControl,
                    id,
                    "control description must not be blank",
                ));
            }
            control.description = description;
        }
        let scored = score_control(&update.attributes);
        control.attributes = update.attributes;
        control.score = scored.score;
        control.reduction_quadrants = scored.quadrants;
        control.updated_at = Utc::now();

        self.storage
            .replace_control(control.clone())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::RiskControl, id, e))?;

        tracing::info!(
            tenant = %tenant,
            control_id = %id,
            score = control.score,
            quadrants = control.reduction_quadrants,
            "Risk control updated"
        );
        self.calculate_residual_risk(tenant, &control.risk_assessment_id)
            .await?;
        Ok(control)
    }

    /// Detach a control and refresh the residual risk it contributed to
    pub async fn delete_control(&self, tenant: &TenantId, id: &RiskControlId) -> ContinuityResult<RiskControl> {
        let control = self
            .storage
            .delete_control(tenant, id)
            .await?
            .ok_or_else(|| ContinuityError::not_found(EntityKind::RiskControl, id))?;

        tracing::info!(tenant = %tenant, control_id = %id, "Risk control deleted");
        self.calculate_residual_risk(tenant, &control.risk_assessment_id)
            .await?;
        Ok(control)
    }

    /// Recompute and persist residual probability, impact and score.
    ///
    /// Derived purely from the inherent values and the attached controls,
    /// so repeated calls yield the same result. An unchanged residual is
    /// not written again.
    pub async fn calculate_residual_risk(
        &self,
        tenant: &TenantId,
        risk_id: &RiskAssessmentId,
    ) -> ContinuityResult<RiskAssessment> {
        let assessment = self.get_assessment(tenant, risk_id).await?;
        let controls = self.storage.list_controls(tenant, risk_id).await?;

        let residual = residual_risk(
            assessment.probability_before,
            assessment.impact_before,
            controls.iter().map(|c| c.reduction_quadrants),
        );
        if assessment.residual() == residual {
            return Ok(assessment);
        }

        let updated = self
            .storage
            .update_residual(tenant, risk_id, residual, Utc::now())
            .await
            .map_err(|e| ContinuityError::from_storage(EntityKind::RiskAssessment, risk_id, e))?;

        tracing::debug!(
            risk_id = %risk_id,
            controls = controls.len(),
            probability_after = residual.probability,
            impact_after = residual.impact,
            score_after = residual.score,
            "Residual risk recalculated"
        );
        Ok(updated)
    }

    pub async fn controls_for(
        &self,
        tenant: &TenantId,
        risk_id: &RiskAssessmentId,
    ) -> ContinuityResult<Vec<RiskControl>> {
        self.get_assessment(tenant, risk_id).await?;
        Ok(self.storage.list_controls(tenant, risk_id).await?)
    }
}

fn check_scale(field: &str, value: u32) -> ContinuityResult<()> {
    if (RISK_SCALE_MIN..=RISK_SCALE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ContinuityError::validation(
            EntityKind::RiskAssessment,
            "",
            format!("{field} must be between {RISK_SCALE_MIN} and {RISK_SCALE_MAX}, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_storage::InMemoryContinuityStorage;
    use continuity_types::{
        ApplicationCriteria, Automation, ControlType, Documentation, Effectiveness,
    };
    use std::sync::Arc;

    fn treatment() -> RiskTreatment {
        RiskTreatment::new(Arc::new(InMemoryContinuityStorage::new()))
    }

    fn acme() -> TenantId {
        TenantId::new("acme")
    }

    fn strongest() -> ControlAttributes {
        ControlAttributes {
            control_type: ControlType::Preventive,
            application_criteria: ApplicationCriteria::Always,
            documentation: Documentation::Yes,
            effectiveness: Effectiveness::Effective,
            automation: Automation::Automatic,
        }
    }

    /// 8 + 10 + 15 + 25 + 15 = 73, one quadrant
    fn moderate() -> ControlAttributes {
        ControlAttributes {
            control_type: ControlType::Detective,
            application_criteria: ApplicationCriteria::Always,
            documentation: Documentation::Yes,
            effectiveness: Effectiveness::NeedsImprovement,
            automation: Automation::Automatic,
        }
    }

    async fn assessment(risk: &RiskTreatment, p: u32, i: u32) -> RiskAssessment {
        risk.create_assessment(
            &acme(),
            NewRiskAssessment {
                title: "Primary site outage".into(),
                probability_before: p,
                impact_before: i,
            },
        )
        .await
        .unwrap()
    }

    fn control(risk_id: &RiskAssessmentId, attributes: ControlAttributes) -> NewControl {
        NewControl {
            risk_assessment_id: risk_id.clone(),
            description: "Hot standby".into(),
            attributes,
        }
    }

    #[tokio::test]
    async fn test_create_control_scores_and_recomputes() {
        let risk = treatment();
        let a = assessment(&risk, 3, 5).await;

        let c = risk.create_control(&acme(), control(&a.id, strongest())).await.unwrap();
        assert_eq!(c.score, 100);
        assert_eq!(c.reduction_quadrants, 2);

        let refreshed = risk.get_assessment(&acme(), &a.id).await.unwrap();
        assert_eq!(refreshed.probability_after, 1);
        assert_eq!(refreshed.impact_after, 5);
        assert_eq!(refreshed.score_after, 5);
        assert_eq!(refreshed.score_before, 15);
    }

    #[tokio::test]
    async fn test_three_quadrants_reduce_both_axes() {
        let risk = treatment();
        let a = assessment(&risk, 3, 5).await;
        risk.create_control(&acme(), control(&a.id, strongest())).await.unwrap();
        risk.create_control(&acme(), control(&a.id, moderate())).await.unwrap();

        let residual = risk.calculate_residual_risk(&acme(), &a.id).await.unwrap();
        assert_eq!(
            (residual.probability_after, residual.impact_after, residual.score_after),
            (1, 4, 4)
        );

        let again = risk.calculate_residual_risk(&acme(), &a.id).await.unwrap();
        assert_eq!(again.score_after, residual.score_after);
        assert_eq!(again.updated_at, residual.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_refresh_residual() {
        let risk = treatment();
        let a = assessment(&risk, 4, 4).await;
        let c = risk.create_control(&acme(), control(&a.id, moderate())).await.unwrap();
        assert_eq!(risk.get_assessment(&acme(), &a.id).await.unwrap().score_after, 12);

        risk.update_control(
            &acme(),
            &c.id,
            ControlUpdate {
                description: None,
                attributes: strongest(),
            },
        )
        .await
        .unwrap();
        assert_eq!(risk.get_assessment(&acme(), &a.id).await.unwrap().score_after, 8);

        risk.delete_control(&acme(), &c.id).await.unwrap();
        let after = risk.get_assessment(&acme(), &a.id).await.unwrap();
        assert_eq!(after.score_after, after.score_before);
        assert!(risk.controls_for(&acme(), &a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assessment_scale_is_validated() {
        let risk = treatment();
        let err = risk
            .create_assessment(
                &acme(),
                NewRiskAssessment {
                    title: "Flood".into(),
                    probability_before: 0,
                    impact_before: 3,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContinuityError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_control_on_missing_assessment_is_not_found() {
        let risk = treatment();
        let err = risk
            .create_control(&acme(), control(&RiskAssessmentId::new("nope"), strongest()))
            .await
            .unwrap_err();
        assert!(matches!(err, ContinuityError::NotFound { entity: EntityKind::RiskAssessment, .. }));
    }
}

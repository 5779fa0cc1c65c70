//! Risk assessments and mitigating controls

use crate::{RiskAssessmentId, RiskControlId, TenantId};
use chrono::{DateTime, Utc};
use continuity_scoring::{ControlAttributes, ControlScore, ResidualRisk};
use serde::{Deserialize, Serialize};

/// Lowest value on the probability/impact matrix
pub const RISK_SCALE_MIN: u32 = 1;

/// Highest value on the probability/impact matrix
pub const RISK_SCALE_MAX: u32 = 5;

/// Quantitative risk record with inherent and residual exposure
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub id: RiskAssessmentId,
    pub tenant_id: TenantId,
    pub title: String,
    pub probability_before: u32,
    pub impact_before: u32,
    /// `probability_before * impact_before`, fixed at creation
    pub score_before: u32,
    pub probability_after: u32,
    pub impact_after: u32,
    pub score_after: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// A new assessment starts with residual equal to inherent exposure
    pub fn new(
        tenant_id: TenantId,
        title: impl Into<String>,
        probability_before: u32,
        impact_before: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let score_before = probability_before * impact_before;
        Self {
            id: RiskAssessmentId::generate(),
            tenant_id,
            title: title.into(),
            probability_before,
            impact_before,
            score_before,
            probability_after: probability_before,
            impact_after: impact_before,
            score_after: score_before,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn residual(&self) -> ResidualRisk {
        ResidualRisk {
            probability: self.probability_after,
            impact: self.impact_after,
            score: self.score_after,
        }
    }

    pub fn set_residual(&mut self, residual: ResidualRisk, now: DateTime<Utc>) {
        self.probability_after = residual.probability;
        self.impact_after = residual.impact;
        self.score_after = residual.score;
        self.updated_at = now;
    }
}

/// A mitigating control attached to exactly one risk assessment
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskControl {
    pub id: RiskControlId,
    pub tenant_id: TenantId,
    pub risk_assessment_id: RiskAssessmentId,
    pub description: String,
    #[serde(flatten)]
    pub attributes: ControlAttributes,
    /// Derived from `attributes`
    pub score: u32,
    /// Derived from `score`
    pub reduction_quadrants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RiskControl {
    pub fn new(
        tenant_id: TenantId,
        risk_assessment_id: RiskAssessmentId,
        description: impl Into<String>,
        attributes: ControlAttributes,
        scored: ControlScore,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RiskControlId::generate(),
            tenant_id,
            risk_assessment_id,
            description: description.into(),
            attributes,
            score: scored.score,
            reduction_quadrants: scored.quadrants,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_scoring::*;

    #[test]
    fn test_new_assessment_residual_equals_inherent() {
        let risk = RiskAssessment::new(TenantId::new("acme"), "Data centre fire", 3, 5, Utc::now());
        assert_eq!(risk.score_before, 15);
        assert_eq!(risk.residual(), ResidualRisk { probability: 3, impact: 5, score: 15 });
    }

    #[test]
    fn test_control_flattens_attributes() {
        let attributes = ControlAttributes {
            control_type: ControlType::Detective,
            application_criteria: ApplicationCriteria::Random,
            documentation: Documentation::Partial,
            effectiveness: Effectiveness::NeedsImprovement,
            automation: Automation::Manual,
        };
        let control = RiskControl::new(
            TenantId::new("acme"),
            RiskAssessmentId::new("r1"),
            "Smoke detectors",
            attributes,
            score_control(&attributes),
            Utc::now(),
        );
        let json = serde_json::to_value(&control).unwrap();
        assert_eq!(json["controlType"], "DETECTIVE");
        assert_eq!(json["isDocumented"], "PARTIAL");
        assert_eq!(json["riskAssessmentId"], "r1");
        assert_eq!(json["score"], 55);
        assert_eq!(json["reductionQuadrants"], 0);
    }
}

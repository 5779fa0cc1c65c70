//! Risk-control scoring engine.
//!
//! Converts the qualitative attributes of a mitigating control into an
//! additive point score (0..=100) and a number of reduction *quadrants*,
//! then applies the quadrants of every control attached to a risk to its
//! inherent probability and impact.
//!
//! Everything here is pure: no I/O, no clock, no allocation beyond the
//! caller's iterator.
//!
//! # Example
//!
//! ```rust
//! use continuity_scoring::*;
//!
//! let control = ControlAttributes {
//!     control_type: ControlType::Preventive,
//!     application_criteria: ApplicationCriteria::Always,
//!     documentation: Documentation::Yes,
//!     effectiveness: Effectiveness::Effective,
//!     automation: Automation::Automatic,
//! };
//! let scored = score_control(&control);
//! assert_eq!(scored.score, 100);
//! assert_eq!(scored.quadrants, 2);
//!
//! let residual = residual_risk(3, 5, [2u32, 1]);
//! assert_eq!((residual.probability, residual.impact, residual.score), (1, 4, 4));
//! ```

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Highest score any control can reach.
pub const MAX_CONTROL_SCORE: u32 = 100;

/// Score at or above which a control counts as a strong mitigation.
pub const STRONG_THRESHOLD: u32 = 81;

/// Score at or above which a control counts as a moderate mitigation.
pub const MODERATE_THRESHOLD: u32 = 61;

/// Quadrants that are always spent on probability before impact.
pub const MAX_PROBABILITY_REDUCTION: u32 = 2;

/// Residual probability and impact never drop below this.
pub const RESIDUAL_FLOOR: u32 = 1;

// ── Control attributes ───────────────────────────────────────────────

/// What a control does relative to the risk event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    Preventive,
    Detective,
    Corrective,
}

impl ControlType {
    pub fn points(self) -> u32 {
        match self {
            Self::Preventive => 10,
            Self::Detective => 8,
            Self::Corrective => 3,
        }
    }
}

/// How consistently the control is applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationCriteria {
    Always,
    Random,
}

impl ApplicationCriteria {
    pub fn points(self) -> u32 {
        match self {
            Self::Always => 10,
            Self::Random => 5,
        }
    }
}

/// Whether the control is written down
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Documentation {
    Yes,
    Partial,
    No,
}

impl Documentation {
    pub fn points(self) -> u32 {
        match self {
            Self::Yes => 15,
            Self::Partial => 7,
            Self::No => 0,
        }
    }
}

/// Observed effectiveness of the control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effectiveness {
    Effective,
    NeedsImprovement,
    NotEffective,
}

impl Effectiveness {
    pub fn points(self) -> u32 {
        match self {
            Self::Effective => 50,
            Self::NeedsImprovement => 25,
            Self::NotEffective => 0,
        }
    }
}

/// Whether the control runs without human intervention
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Automation {
    Automatic,
    Manual,
}

impl Automation {
    pub fn points(self) -> u32 {
        match self {
            Self::Automatic => 15,
            Self::Manual => 10,
        }
    }
}

/// The five scored attributes of a risk control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAttributes {
    pub control_type: ControlType,
    pub application_criteria: ApplicationCriteria,
    #[serde(rename = "isDocumented")]
    pub documentation: Documentation,
    pub effectiveness: Effectiveness,
    pub automation: Automation,
}

// ── Scores ───────────────────────────────────────────────────────────

/// Result of scoring a single control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScore {
    /// Additive point total, 0..=100
    pub score: u32,
    /// Reduction quadrants granted by the score, 0..=2
    pub quadrants: u32,
}

/// Residual exposure after controls are applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualRisk {
    pub probability: u32,
    pub impact: u32,
    pub score: u32,
}

/// Score a control by summing the points of each attribute.
pub fn score_control(control: &ControlAttributes) -> ControlScore {
    let score = control.control_type.points()
        + control.application_criteria.points()
        + control.documentation.points()
        + control.effectiveness.points()
        + control.automation.points();

    ControlScore {
        score,
        quadrants: quadrants_for(score),
    }
}

/// Map a control score onto its mitigation tier.
pub fn quadrants_for(score: u32) -> u32 {
    if score >= STRONG_THRESHOLD {
        2
    } else if score >= MODERATE_THRESHOLD {
        1
    } else {
        0
    }
}

/// Apply the quadrants of every control to an inherent probability/impact.
///
/// Up to [`MAX_PROBABILITY_REDUCTION`] quadrants reduce probability; the
/// remainder reduce impact. Both axes are floored at [`RESIDUAL_FLOOR`].
pub fn residual_risk<I>(probability_before: u32, impact_before: u32, quadrants: I) -> ResidualRisk
where
    I: IntoIterator<Item = u32>,
{
    let total: u32 = quadrants.into_iter().fold(0u32, u32::saturating_add);
    let probability_reduction = total.min(MAX_PROBABILITY_REDUCTION);
    let impact_reduction = total - probability_reduction;

    let probability = probability_before
        .saturating_sub(probability_reduction)
        .max(RESIDUAL_FLOOR);
    let impact = impact_before
        .saturating_sub(impact_reduction)
        .max(RESIDUAL_FLOOR);

    ResidualRisk {
        probability,
        impact,
        score: probability * impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strongest() -> ControlAttributes {
        ControlAttributes {
            control_type: ControlType::Preventive,
            application_criteria: ApplicationCriteria::Always,
            documentation: Documentation::Yes,
            effectiveness: Effectiveness::Effective,
            automation: Automation::Automatic,
        }
    }

    #[test]
    fn test_strongest_control_scores_full_marks() {
        let scored = score_control(&strongest());
        assert_eq!(scored.score, MAX_CONTROL_SCORE);
        assert_eq!(scored.quadrants, 2);
    }

    #[test]
    fn test_weakest_control() {
        let scored = score_control(&ControlAttributes {
            control_type: ControlType::Corrective,
            application_criteria: ApplicationCriteria::Random,
            documentation: Documentation::No,
            effectiveness: Effectiveness::NotEffective,
            automation: Automation::Manual,
        });
        assert_eq!(scored.score, 18);
        assert_eq!(scored.quadrants, 0);
    }

    #[test]
    fn test_moderate_control() {
        // 8 + 10 + 7 + 25 + 15 = 65
        let scored = score_control(&ControlAttributes {
            control_type: ControlType::Detective,
            application_criteria: ApplicationCriteria::Always,
            documentation: Documentation::Partial,
            effectiveness: Effectiveness::NeedsImprovement,
            automation: Automation::Automatic,
        });
        assert_eq!(scored.score, 65);
        assert_eq!(scored.quadrants, 1);
    }

    #[test]
    fn test_quadrant_thresholds() {
        assert_eq!(quadrants_for(60), 0);
        assert_eq!(quadrants_for(61), 1);
        assert_eq!(quadrants_for(80), 1);
        assert_eq!(quadrants_for(81), 2);
    }

    #[test]
    fn test_residual_spends_probability_first() {
        let residual = residual_risk(3, 5, [2, 1]);
        assert_eq!(residual.probability, 1);
        assert_eq!(residual.impact, 4);
        assert_eq!(residual.score, 4);
    }

    #[test]
    fn test_residual_without_controls_is_inherent() {
        let residual = residual_risk(4, 3, std::iter::empty());
        assert_eq!(residual, ResidualRisk { probability: 4, impact: 3, score: 12 });
    }

    #[test]
    fn test_residual_floors_at_one() {
        let residual = residual_risk(2, 2, [2, 2, 2, 2]);
        assert_eq!(residual.probability, 1);
        assert_eq!(residual.impact, 1);
        assert_eq!(residual.score, 1);
    }

    #[test]
    fn test_attribute_wire_names() {
        let json = serde_json::to_value(strongest()).unwrap();
        assert_eq!(json["controlType"], "PREVENTIVE");
        assert_eq!(json["applicationCriteria"], "ALWAYS");
        assert_eq!(json["isDocumented"], "YES");
        assert_eq!(json["effectiveness"], "EFFECTIVE");
        assert_eq!(json["automation"], "AUTOMATIC");

        let parsed: Effectiveness = serde_json::from_str("\"NEEDS_IMPROVEMENT\"").unwrap();
        assert_eq!(parsed, Effectiveness::NeedsImprovement);
    }

    fn arb_control() -> impl Strategy<Value = ControlAttributes> {
        (
            prop_oneof![
                Just(ControlType::Preventive),
                Just(ControlType::Detective),
                Just(ControlType::Corrective),
            ],
            prop_oneof![Just(ApplicationCriteria::Always), Just(ApplicationCriteria::Random)],
            prop_oneof![
                Just(Documentation::Yes),
                Just(Documentation::Partial),
                Just(Documentation::No),
            ],
            prop_oneof![
                Just(Effectiveness::Effective),
                Just(Effectiveness::NeedsImprovement),
                Just(Effectiveness::NotEffective),
            ],
            prop_oneof![Just(Automation::Automatic), Just(Automation::Manual)],
        )
            .prop_map(
                |(control_type, application_criteria, documentation, effectiveness, automation)| {
                    ControlAttributes {
                        control_type,
                        application_criteria,
                        documentation,
                        effectiveness,
                        automation,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn property_score_is_bounded_and_deterministic(control in arb_control()) {
            let first = score_control(&control);
            let second = score_control(&control);
            prop_assert_eq!(first, second);
            prop_assert!(first.score <= MAX_CONTROL_SCORE);
            prop_assert!(first.quadrants <= 2);
        }

        #[test]
        fn property_quadrants_monotonic(a in 0u32..=100, b in 0u32..=100) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(quadrants_for(low) <= quadrants_for(high));
        }

        #[test]
        fn property_residual_never_below_floor(
            probability in 0u32..=10,
            impact in 0u32..=10,
            quadrants in proptest::collection::vec(0u32..=2, 0..12),
        ) {
            let residual = residual_risk(probability, impact, quadrants);
            prop_assert!(residual.probability >= RESIDUAL_FLOOR);
            prop_assert!(residual.impact >= RESIDUAL_FLOOR);
            prop_assert_eq!(residual.score, residual.probability * residual.impact);
        }
    }
}

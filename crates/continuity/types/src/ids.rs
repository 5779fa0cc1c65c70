//! Identifier newtypes.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// An isolated customer organization
    TenantId
);
string_id!(
    /// An authenticated user within a tenant
    UserId
);
string_id!(WorkflowId);
string_id!(
    /// Caller-supplied step identifier, unique within its workflow
    StepId
);
string_id!(CampaignId);
string_id!(ProcessId);
string_id!(BiaAssessmentId);
string_id!(PolicyId);
string_id!(RiskAssessmentId);
string_id!(RiskControlId);

/// The kind of record an error or event refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Workflow,
    Step,
    Campaign,
    Process,
    BiaAssessment,
    Policy,
    RiskAssessment,
    RiskControl,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Step => "step",
            Self::Campaign => "campaign",
            Self::Process => "process",
            Self::BiaAssessment => "bia-assessment",
            Self::Policy => "policy",
            Self::RiskAssessment => "risk-assessment",
            Self::RiskControl => "risk-control",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

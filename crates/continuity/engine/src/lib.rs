//! Task orchestration and risk quantification for business continuity.
//!
//! The engines share one tenant-scoped store and never touch each other's
//! records directly, except that the campaign orchestrator builds its
//! workflows through the [`WorkflowEngine`].
//!
//! - [`WorkflowEngine`]: approval workflows with idempotent step decisions
//! - [`CampaignOrchestrator`]: BIA campaign creation, launch and progress
//! - [`DocumentLifecycle`]: policy DRAFT → REVIEW → APPROVED → ACTIVE
//! - [`RiskTreatment`]: risk controls and residual risk
//! - [`ProcessDirectory`]: the process and BIA records campaigns read
//!
//! Every operation takes the caller's [`TenantId`](continuity_types::TenantId)
//! explicitly; nothing is looked up by id alone.
//!
//! # Example
//!
//! ```rust
//! use continuity_engine::{ContinuityCore, EngineConfig, NewCampaign};
//! use continuity_storage::InMemoryContinuityStorage;
//! use continuity_types::{CampaignStatus, TenantId, UserId};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let core = ContinuityCore::new(Arc::new(InMemoryContinuityStorage::new()), EngineConfig::default());
//! let tenant = TenantId::new("acme");
//! let user = UserId::new("bcm-lead");
//!
//! let campaign = core
//!     .campaigns()
//!     .create(&tenant, &user, NewCampaign {
//!         name: "Annual BIA".into(),
//!         description: None,
//!         deadline: chrono::Utc::now() + chrono::Duration::days(30),
//!         target_processes: vec![],
//!     })
//!     .await
//!     .unwrap();
//!
//! let outcome = core.campaigns().launch(&tenant, &campaign.id, &user).await.unwrap();
//! assert_eq!(outcome.workflows_created, 0);
//! assert_eq!(outcome.campaign.status, CampaignStatus::Active);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![deny(unsafe_code)]

pub mod campaign;
pub mod config;
pub mod document;
pub mod error;
pub mod records;
pub mod risk;
pub mod workflow;

use continuity_storage::ContinuityStorage;
use std::sync::Arc;

pub use campaign::{CampaignOrchestrator, LaunchOutcome, NewCampaign, BIA_APPROVAL_STEP};
pub use config::EngineConfig;
pub use document::{DocumentLifecycle, NewPolicy};
pub use error::{ContinuityError, ContinuityResult};
pub use records::{NewBiaAssessment, NewProcess, ProcessDirectory};
pub use risk::{ControlUpdate, NewControl, NewRiskAssessment, RiskTreatment};
pub use workflow::{NewWorkflow, WorkflowEngine};

/// Storage handle shared by every engine
pub type SharedStorage = Arc<dyn ContinuityStorage>;

/// All engines wired to one store
#[derive(Clone)]
pub struct ContinuityCore {
    workflows: WorkflowEngine,
    campaigns: CampaignOrchestrator,
    documents: DocumentLifecycle,
    risk: RiskTreatment,
    processes: ProcessDirectory,
}

impl ContinuityCore {
    pub fn new(storage: SharedStorage, config: EngineConfig) -> Self {
        let workflows = WorkflowEngine::new(storage.clone(), config);
        Self {
            campaigns: CampaignOrchestrator::new(storage.clone(), workflows.clone()),
            documents: DocumentLifecycle::new(storage.clone()),
            risk: RiskTreatment::new(storage.clone()),
            processes: ProcessDirectory::new(storage),
            workflows,
        }
    }

    pub fn workflows(&self) -> &WorkflowEngine {
        &self.workflows
    }

    pub fn campaigns(&self) -> &CampaignOrchestrator {
        &self.campaigns
    }

    pub fn documents(&self) -> &DocumentLifecycle {
        &self.documents
    }

    pub fn risk(&self) -> &RiskTreatment {
        &self.risk
    }

    pub fn processes(&self) -> &ProcessDirectory {
        &self.processes
    }
}

//! Storage contracts for the continuity core.
//!
//! Every read and write is scoped by [`TenantId`](continuity_types::TenantId).
//! A record owned by another tenant is indistinguishable from a missing one.
//!
//! Writes that must not interleave are expressed as single trait calls:
//! - [`WorkflowStore::replace_workflow`] is a revision compare-and-set
//! - [`CampaignStore::activate_campaign`] inserts all workflows and flips the
//!   campaign to ACTIVE in one step, or does nothing
//! - [`PolicyStore::save_policy`] only lands if the stored status still matches

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryContinuityStorage;
pub use traits::{
    BiaAssessmentStore, CampaignStore, ContinuityStorage, PolicyStore, ProcessStore, QueryWindow,
    RiskStore, WorkflowStore,
};

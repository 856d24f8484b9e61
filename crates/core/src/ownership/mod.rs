//! Ownership ledger module - current holder per tracked mint.

mod ownership_model;
mod ownership_service;
mod ownership_traits;


pub use ownership_model::{OwnershipRecord, ProcessResult, SkipReason, TransferOutcome};
pub use ownership_service::OwnershipService;
pub use ownership_traits::{OwnershipRepositoryTrait, OwnershipServiceTrait};

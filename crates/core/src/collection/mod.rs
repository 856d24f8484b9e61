//! Tracked collection module - the set of mints whose transfers are admitted.

mod collection_model;
mod collection_service;
mod collection_traits;

pub use collection_model::{NewTrackedMint, TrackedMint};
pub use collection_service::{parse_mint_list, CollectionService};
pub use collection_traits::{CollectionRepositoryTrait, CollectionServiceTrait};

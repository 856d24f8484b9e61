mod model;
mod repository;

pub use model::{NewTrackedMintDB, TrackedMintDB};
pub use repository::CollectionRepository;

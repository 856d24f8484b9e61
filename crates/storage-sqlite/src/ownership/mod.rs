mod model;
mod repository;

pub use model::OwnershipRecordDB;
pub use repository::OwnershipRepository;

// ==========================================
// NCIP Registry Import - Repository layer
// ==========================================
// Red line: repositories hold no business logic
// Role: persisted store and partition index behind async traits
// Constraint: every query is parameterized
// ==========================================

pub mod error;
pub mod record_store;
pub mod record_store_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::{PartitionIndex, RecordStore};
pub use record_store_impl::SqliteRecordStore;

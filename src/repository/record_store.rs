// ==========================================
// NCIP Registry Import - Persisted store traits
// ==========================================
// Role: boundary consumed by the reconciler (no business rules here)
// Collections: the default record set plus named partitions
// ==========================================

use crate::domain::{CanonicalRecord, PartitionMeta, StoredRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RecordStore Trait
// ==========================================
// Implementers: SqliteRecordStore, test doubles
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a document and return its store-assigned id.
    async fn create(&self, collection: &str, record: &CanonicalRecord) -> RepositoryResult<String>;

    /// Merge `record` into the document `id`; incoming fields overwrite, id is kept.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        record: &CanonicalRecord,
    ) -> RepositoryResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()>;

    /// Drop the named canonical fields (and their legacy aliases) from a document.
    async fn remove_fields(
        &self,
        collection: &str,
        id: &str,
        fields: &[&str],
    ) -> RepositoryResult<()>;

    async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> RepositoryResult<Vec<StoredRecord>>;

    async fn list_all(&self, collection: &str) -> RepositoryResult<Vec<StoredRecord>>;
}

// ==========================================
// PartitionIndex Trait
// ==========================================
// Per-owner registry of partitions created by NewPartition runs
#[async_trait]
pub trait PartitionIndex: Send + Sync {
    async fn register(
        &self,
        owner_id: &str,
        partition_name: &str,
        meta: &PartitionMeta,
    ) -> RepositoryResult<()>;

    async fn list(&self, owner_id: &str) -> RepositoryResult<Vec<PartitionMeta>>;
}

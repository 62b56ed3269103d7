// ==========================================
// NCIP Registry Import - Import configuration reader trait
// ==========================================
// Role: configuration the reconciler and store need (no implementation)
// Red line: read-only, no business logic
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implementer: ConfigManager (config_kv table)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== Collections =====

    /// Collection holding the owner's default record set.
    ///
    /// # Default
    /// - "mappings"
    async fn get_default_collection(&self) -> ConfigResult<String>;

    /// Prefix for generated and user-named partitions.
    ///
    /// # Default
    /// - "import_"
    async fn get_partition_prefix(&self) -> ConfigResult<String>;

    /// Whether the store may create collections outside the grant list.
    ///
    /// When false, writes to ungranted partitions are denied and
    /// NewPartition runs fall back to the default collection.
    ///
    /// # Default
    /// - true
    async fn get_allow_partition_collections(&self) -> ConfigResult<bool>;

    // ===== Ongoing working set =====

    /// Status phrases that mark a record as still in progress.
    ///
    /// # Default
    /// - on process, for processing, processing, on-process, ongoing, in process
    async fn get_ongoing_status_keywords(&self) -> ConfigResult<Vec<String>>;
}

// ==========================================
// NCIP Registry Import - Reconciler errors
// ==========================================
// Every variant raised after a write carries the partial summary,
// committed records are never rolled back
// ==========================================

use crate::domain::ReconcileSummary;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Replace mode stopped during deletion; no record was written.
    #[error("Replace aborted while deleting {id} ({deleted} removed before the failure): {source}")]
    DeleteFailed {
        id: String,
        deleted: usize,
        #[source]
        source: RepositoryError,
    },

    /// A create/update failed; `summary` counts what was committed before it.
    #[error("Import aborted after {} committed records: {source}", summary.committed())]
    Aborted {
        summary: ReconcileSummary,
        #[source]
        source: RepositoryError,
    },

    /// Records were written but the partition could not be registered.
    #[error("Partition {partition_name} was written but not registered: {source}")]
    PartitionIndex {
        partition_name: String,
        summary: ReconcileSummary,
        #[source]
        source: RepositoryError,
    },

    /// Existing partitions could not be read; nothing was written.
    #[error("Cannot check existing partitions for {partition_name}: {source}")]
    PartitionLookup {
        partition_name: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Import cancelled after {} committed records", summary.committed())]
    Cancelled { summary: ReconcileSummary },

    #[error("Configuration unavailable: {0}")]
    Config(String),
}

impl ReconcileError {
    /// Partial summary for failures that happened after writes began.
    pub fn partial_summary(&self) -> Option<&ReconcileSummary> {
        match self {
            ReconcileError::Aborted { summary, .. }
            | ReconcileError::PartitionIndex { summary, .. }
            | ReconcileError::Cancelled { summary } => Some(summary),
            ReconcileError::DeleteFailed { .. }
            | ReconcileError::PartitionLookup { .. }
            | ReconcileError::Config(_) => None,
        }
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

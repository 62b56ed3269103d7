// ==========================================
// NCIP Registry Import - Import API
// ==========================================
// Role: caller-facing facade over normalization and reconciliation
// Contract: every reconcile run ends in exactly one summary message
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{
    CanonicalRecord, ImportMode, PartitionMeta, RawSheet, ReconcileSummary, SheetImportReport,
    StoredRecord,
};
use crate::engine::{
    clear_ongoing_flags, ImportReconciler, OngoingDetector, ReconcileError, ReconcileOptions,
};
use crate::importer::{SheetImporter, SheetNormalizer};
use crate::repository::{PartitionIndex, RecordStore, SqliteRecordStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// Response types
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunResponse {
    /// The single user-visible summary message.
    pub message: String,
    pub summary: ReconcileSummary,
    /// Collection the records were written to / reloaded from.
    pub collection: String,
    pub active_view: Vec<StoredRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileImportResponse {
    pub sheets: Vec<SheetOverview>,
    /// Rows the row validator dropped before reconciliation.
    pub rows_skipped: usize,
    pub run: ImportRunResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOverview {
    pub sheet_name: String,
    pub matched_fields: Vec<String>,
    pub records: usize,
    pub skipped_rows: usize,
}

impl From<&SheetImportReport> for SheetOverview {
    fn from(report: &SheetImportReport) -> Self {
        Self {
            sheet_name: report.sheet_name.clone(),
            matched_fields: report.matched_fields.clone(),
            records: report.records.len(),
            skipped_rows: report.skipped_rows.len(),
        }
    }
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    importer: SheetImporter,
    store: Arc<dyn RecordStore>,
    partitions: Arc<dyn PartitionIndex>,
    config: Arc<dyn ImportConfigReader>,
    reconciler: ImportReconciler<dyn RecordStore, dyn PartitionIndex, dyn ImportConfigReader>,
}

impl ImportApi {
    pub fn new(
        store: Arc<dyn RecordStore>,
        partitions: Arc<dyn PartitionIndex>,
        config: Arc<dyn ImportConfigReader>,
    ) -> Self {
        let reconciler = ImportReconciler::new(store.clone(), partitions.clone(), config.clone());
        Self {
            importer: SheetImporter::default(),
            store,
            partitions,
            config,
            reconciler,
        }
    }

    /// Open (or create) the SQLite database and wire the default stack.
    ///
    /// The store's collection policy is read from configuration once, here.
    pub async fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let default_collection = config
            .get_default_collection()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let allow_partitions = config
            .get_allow_partition_collections()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let store = Arc::new(
            SqliteRecordStore::from_connection(conn)
                .with_access_policy(default_collection, allow_partitions),
        );

        info!(db_path, allow_partitions, "import api opened");
        Ok(Self::new(store.clone(), store, Arc::new(config)))
    }

    // ===== Normalization =====

    pub fn normalize_and_build(&self, sheet: &RawSheet) -> SheetImportReport {
        self.importer.normalize_and_build(sheet)
    }

    /// Parse a CSV/Excel file and normalize every sheet in it.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<Vec<SheetImportReport>> {
        Ok(self.importer.import_file(path)?)
    }

    // ===== Reconciliation =====

    /// Reconcile validated records against the owner's default set.
    ///
    /// Partial and failed runs come back as `ApiError::ImportFailed`
    /// carrying the summary message and, if any writes happened, the counts.
    pub async fn reconcile(
        &self,
        records: Vec<CanonicalRecord>,
        mode: ImportMode,
        options: &ReconcileOptions,
        progress: &mut (dyn FnMut(u8) + Send),
    ) -> ApiResult<ImportRunResponse> {
        if options.owner_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("owner id is required".to_string()));
        }

        let default_collection = self.default_collection().await?;
        let existing = self
            .store
            .query_by_owner(&default_collection, &options.owner_id)
            .await?;

        match self
            .reconciler
            .reconcile(records, mode, options, &existing, progress)
            .await
        {
            Ok(outcome) => {
                let message = success_message(&outcome.summary, mode);
                info!(%message, "import run completed");
                Ok(ImportRunResponse {
                    message,
                    summary: outcome.summary,
                    collection: outcome.collection,
                    active_view: outcome.active_view,
                })
            }
            Err(err) => {
                let message = failure_message(&err);
                let summary = err.partial_summary().cloned();
                let partial = summary.as_ref().map(|s| s.committed() > 0).unwrap_or(false);
                warn!(%message, partial, "import run did not complete");
                Err(ApiError::ImportFailed {
                    message,
                    partial,
                    summary,
                })
            }
        }
    }

    /// Parse, normalize and reconcile a whole file as one batch.
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        mode: ImportMode,
        options: &ReconcileOptions,
        progress: &mut (dyn FnMut(u8) + Send),
    ) -> ApiResult<FileImportResponse> {
        let reports = self.parse_file(path)?;
        let sheets: Vec<SheetOverview> = reports.iter().map(SheetOverview::from).collect();
        let rows_skipped = reports.iter().map(|r| r.skipped_rows.len()).sum();
        let records: Vec<CanonicalRecord> =
            reports.into_iter().flat_map(|r| r.records).collect();

        if records.is_empty() {
            return Err(ApiError::ImportError(
                "no importable rows found in the file".to_string(),
            ));
        }

        let run = self.reconcile(records, mode, options, progress).await?;
        Ok(FileImportResponse {
            sheets,
            rows_skipped,
            run,
        })
    }

    // ===== Record maintenance =====

    pub async fn list_records(
        &self,
        owner_id: &str,
        collection: Option<&str>,
    ) -> ApiResult<Vec<StoredRecord>> {
        let collection = match collection {
            Some(c) => c.to_string(),
            None => self.default_collection().await?,
        };
        Ok(self.store.query_by_owner(&collection, owner_id).await?)
    }

    pub async fn delete_record(&self, id: &str) -> ApiResult<()> {
        let collection = self.default_collection().await?;
        self.store.delete(&collection, id).await?;
        info!(id, collection = %collection, "record deleted");
        Ok(())
    }

    pub async fn list_partitions(&self, owner_id: &str) -> ApiResult<Vec<PartitionMeta>> {
        Ok(self.partitions.list(owner_id).await?)
    }

    // ===== Ongoing working set =====

    pub async fn list_ongoing(&self, owner_id: &str) -> ApiResult<Vec<StoredRecord>> {
        let detector = self.ongoing_detector().await?;
        let records = self.list_records(owner_id, None).await?;
        Ok(detector.filter(&records).into_iter().cloned().collect())
    }

    pub async fn clear_ongoing_flags(&self, owner_id: &str) -> ApiResult<usize> {
        let detector = self.ongoing_detector().await?;
        let collection = self.default_collection().await?;
        Ok(clear_ongoing_flags(self.store.as_ref(), &detector, &collection, owner_id).await?)
    }

    async fn default_collection(&self) -> ApiResult<String> {
        self.config
            .get_default_collection()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    async fn ongoing_detector(&self) -> ApiResult<OngoingDetector> {
        let keywords = self
            .config
            .get_ongoing_status_keywords()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(OngoingDetector::new(keywords))
    }
}

// ==========================================
// Summary messages
// ==========================================

fn counts(summary: &ReconcileSummary) -> String {
    let mut text = format!(
        "{} created, {} updated, {} skipped",
        summary.created, summary.updated, summary.skipped
    );
    if summary.deleted > 0 {
        text.push_str(&format!(", {} deleted", summary.deleted));
    }
    text
}

pub fn success_message(summary: &ReconcileSummary, mode: ImportMode) -> String {
    let mut message = format!("Import complete: {}.", counts(summary));

    match (&summary.partition_name, summary.fallback_occurred) {
        (Some(name), true) => message.push_str(&format!(
            " Note: partition {} could not be created, records were saved to the default set tagged {}.",
            name, name
        )),
        (Some(name), false) if mode == ImportMode::NewPartition => {
            message.push_str(&format!(" Partition {} is ready.", name))
        }
        _ => {}
    }

    message
}

pub fn failure_message(err: &ReconcileError) -> String {
    match err {
        ReconcileError::DeleteFailed { deleted, source, .. } => format!(
            "Import failed: replace stopped after deleting {} records, no records were written ({}).",
            deleted, source
        ),
        ReconcileError::Aborted { summary, source } if summary.committed() > 0 => format!(
            "Import partially completed: {} before an error ({}). Remaining records were not imported.",
            counts(summary),
            source
        ),
        ReconcileError::Aborted { source, .. } => format!("Import failed: {}.", source),
        ReconcileError::PartitionIndex {
            partition_name,
            summary,
            source,
        } => format!(
            "Import partially completed: {}. Warning: partition {} was not registered ({}).",
            counts(summary),
            partition_name,
            source
        ),
        ReconcileError::Cancelled { summary } if summary.committed() > 0 => format!(
            "Import partially completed: {} before the run was cancelled.",
            counts(summary)
        ),
        ReconcileError::Cancelled { .. } => "Import cancelled, no records were written.".to_string(),
        ReconcileError::PartitionLookup { source, .. } => format!(
            "Import failed: existing partitions could not be checked, no records were written ({}).",
            source
        ),
        ReconcileError::Config(msg) => format!("Import failed: {}.", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;

    fn summary(created: usize, updated: usize) -> ReconcileSummary {
        ReconcileSummary {
            created,
            updated,
            ..Default::default()
        }
    }

    #[test]
    fn test_success_message_mentions_fallback() {
        let mut s = summary(2, 0);
        s.partition_name = Some("import_march".to_string());
        s.fallback_occurred = true;

        let message = success_message(&s, ImportMode::NewPartition);
        assert!(message.starts_with("Import complete: 2 created, 0 updated, 0 skipped."));
        assert!(message.contains("default set tagged import_march"));
    }

    #[test]
    fn test_failure_message_distinguishes_partial_runs() {
        let partial = ReconcileError::Aborted {
            summary: summary(3, 1),
            source: RepositoryError::DatabaseQueryError("disk I/O error".to_string()),
        };
        assert!(failure_message(&partial).starts_with("Import partially completed: 3 created, 1 updated"));

        let total = ReconcileError::Aborted {
            summary: summary(0, 0),
            source: RepositoryError::DatabaseQueryError("disk I/O error".to_string()),
        };
        assert!(failure_message(&total).starts_with("Import failed:"));
    }
}

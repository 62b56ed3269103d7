// ==========================================
// NCIP Registry Import - Import run models
// ==========================================
// Raw sheets in, reconciliation summaries out
// ==========================================

use super::record::CanonicalRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawSheet - tabulated sheet from upstream
// ==========================================
// Produced by the file parsers; cells are already stringified
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    pub sheet_name: String,
    pub header_row: Vec<String>,
    pub data_rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new(
        sheet_name: impl Into<String>,
        header_row: Vec<String>,
        data_rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            header_row,
            data_rows,
        }
    }
}

// ==========================================
// PartitionMeta - partition index entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMeta {
    pub partition_name: String,
    pub display_name: String,
    pub record_count: usize,
    pub ongoing: bool,
    pub registered_at: DateTime<Utc>,
}

// ==========================================
// ReconcileSummary - counts of one reconciliation run
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub partition_name: Option<String>,
    pub fallback_occurred: bool,
}

impl ReconcileSummary {
    /// Records committed to the store by this run (creates + updates).
    pub fn committed(&self) -> usize {
        self.created + self.updated
    }
}

// ==========================================
// SkippedRow - row dropped by the row validator
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub sheet_name: String,
    pub row_number: usize, // 1-based, header row excluded
    pub reason: String,
}

// ==========================================
// SheetImportReport - normalize_and_build output for one sheet
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetImportReport {
    pub batch_id: String,
    pub sheet_name: String,
    pub matched_fields: Vec<String>,
    pub records: Vec<CanonicalRecord>,
    pub skipped_rows: Vec<SkippedRow>,
}

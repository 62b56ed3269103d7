// ==========================================
// NCIP Registry Import - Importer traits
// ==========================================
// Role: seams of the normalization pipeline (no implementations here)
// Flow: FileParser → HeaderMatcher → ValueCoercer/CellSplitter
//       → DocumentBuilder → RowValidator
// ==========================================

use crate::domain::{CanonicalRecord, RawSheet, SheetImportReport};
use crate::importer::cell_splitter::SplitCell;
use crate::importer::data_cleaner::TypedValue;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldAssignment;
use crate::importer::field_registry::FieldName;
use std::path::Path;

// ==========================================
// SheetNormalizer Trait
// ==========================================
// Implementer: SheetImporter
pub trait SheetNormalizer: Send + Sync {
    /// Turn one tabulated sheet into validated canonical records.
    ///
    /// Invalid rows are dropped here and reported in `skipped_rows`;
    /// they never reach the reconciler.
    fn normalize_and_build(&self, sheet: &RawSheet) -> SheetImportReport;
}

// ==========================================
// FileParser Trait
// ==========================================
// Upstream adapter, outside the normalization core
// Implementers: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// Parse a file into one `RawSheet` per worksheet.
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>>;
}

// ==========================================
// HeaderMatcher Trait
// ==========================================
// Implementer: FieldMapper
pub trait HeaderMatcher: Send + Sync {
    /// Map raw headers to target fields. Unmatched fields are absent.
    fn match_fields(&self, headers: &[String]) -> FieldAssignment;
}

// ==========================================
// ValueCoercer Trait
// ==========================================
// Implementer: DataCleaner
pub trait ValueCoercer: Send + Sync {
    /// Convert a raw cell to the declared type of `field`. Never fails.
    fn coerce(&self, field: FieldName, raw: &str) -> TypedValue;
}

// ==========================================
// CellSplitter Trait
// ==========================================
// Implementer: IccLocationSplitter
pub trait CellSplitter: Send + Sync {
    /// Separate an icc/location cell authored as one.
    fn split_combined(&self, cell: &str) -> SplitCell;
}

// ==========================================
// DocumentBuilder Trait
// ==========================================
// Implementer: RecordBuilder
pub trait DocumentBuilder: Send + Sync {
    /// Compose one canonical record from a data row.
    fn build(
        &self,
        row: &[String],
        assignment: &FieldAssignment,
        sheet_name: &str,
        batch_id: &str,
    ) -> CanonicalRecord;
}

// ==========================================
// RowValidator Trait
// ==========================================
// Implementer: DqValidator
pub trait RowValidator: Send + Sync {
    /// A record is valid when it carries any identifying information.
    fn is_valid(&self, record: &CanonicalRecord) -> bool;
}

// ==========================================
// NCIP Registry Import - Domain layer
// ==========================================
// Role: entities and value types shared by importer, engine and repository
// Red line: no data access, no engine logic
// ==========================================

pub mod aliases;
pub mod import;
pub mod record;
pub mod types;

pub use import::{PartitionMeta, RawSheet, ReconcileSummary, SheetImportReport, SkippedRow};
pub use record::{CanonicalRecord, StoredRecord};
pub use types::{FieldType, ImportMode};

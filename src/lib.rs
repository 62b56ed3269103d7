// ==========================================
// NCIP Registry Import - Core library
// ==========================================
// Schema Normalization Engine: heterogeneous registry sheets → CanonicalRecords
// Import Reconciler: Append / Replace / NewPartition against the persisted store
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - persisted store
pub mod repository;

// Engine layer - reconciliation
pub mod engine;

// Importer layer - schema normalization
pub mod importer;

// Configuration layer
pub mod config;

// Database bootstrap (PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API layer - caller-facing facade
pub mod api;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    CanonicalRecord, ImportMode, PartitionMeta, RawSheet, ReconcileSummary, SheetImportReport,
    StoredRecord,
};

pub use engine::{ImportReconciler, ReconcileError, ReconcileOptions, ReconcileOutcome};

pub use importer::{SheetImporter, SheetNormalizer};

pub use api::{ApiError, ImportApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "NCIP Registry Import";

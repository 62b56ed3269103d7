// ==========================================
// NCIP Registry Import - Importer layer
// ==========================================
// Role: schema normalization engine
//       tabulated sheet → validated CanonicalRecords
// Supports: Excel workbooks (every worksheet), CSV
// ==========================================

pub mod cell_splitter;
pub mod data_cleaner;
pub mod document_builder;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod field_registry;
pub mod file_parser;
pub mod header_normalizer;
pub mod importer_trait;
pub mod sheet_importer;

// Re-export core types
pub use cell_splitter::{IccLocationSplitter, SplitCell};
pub use data_cleaner::{DataCleaner, TypedValue};
pub use document_builder::{region_from_sheet_name, RecordBuilder};
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldAssignment, FieldMapper, MatchRule, MATCH_RULES};
pub use field_registry::{FieldName, FALLBACK_PROBES, HEADER_VARIANTS};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use header_normalizer::normalize_header;
pub use sheet_importer::SheetImporter;

// Re-export trait seams
pub use importer_trait::{
    CellSplitter, DocumentBuilder, FileParser, HeaderMatcher, RowValidator, SheetNormalizer,
    ValueCoercer,
};

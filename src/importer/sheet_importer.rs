// ==========================================
// NCIP Registry Import - Sheet importer
// ==========================================
// Role: normalize_and_build, the normalization engine entry point
// Flow: match headers → build each row → validate → report
// Red line: synchronous, never suspends, never fails on cell content
// ==========================================

use crate::domain::{CanonicalRecord, RawSheet, SheetImportReport, SkippedRow};
use crate::importer::document_builder::RecordBuilder;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{
    DocumentBuilder, FileParser, HeaderMatcher, RowValidator, SheetNormalizer,
};
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// SheetImporter
// ==========================================
pub struct SheetImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn HeaderMatcher>,
    document_builder: Box<dyn DocumentBuilder>,
    row_validator: Box<dyn RowValidator>,
}

impl SheetImporter {
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn HeaderMatcher>,
        document_builder: Box<dyn DocumentBuilder>,
        row_validator: Box<dyn RowValidator>,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            document_builder,
            row_validator,
        }
    }

    /// Normalize one sheet under an explicit batch id.
    pub fn normalize_with_batch(&self, sheet: &RawSheet, batch_id: &str) -> SheetImportReport {
        let assignment = self.field_mapper.match_fields(&sheet.header_row);

        let mut records: Vec<CanonicalRecord> = Vec::with_capacity(sheet.data_rows.len());
        let mut skipped_rows = Vec::new();

        for (idx, row) in sheet.data_rows.iter().enumerate() {
            let record =
                self.document_builder
                    .build(row, &assignment, &sheet.sheet_name, batch_id);

            if self.row_validator.is_valid(&record) {
                records.push(record);
            } else {
                debug!(sheet = %sheet.sheet_name, row = idx + 1, "row has no identifying field, dropped");
                skipped_rows.push(SkippedRow {
                    sheet_name: sheet.sheet_name.clone(),
                    row_number: idx + 1,
                    reason: "no control number, survey number, applicant or project name"
                        .to_string(),
                });
            }
        }

        info!(
            sheet = %sheet.sheet_name,
            matched_fields = assignment.len(),
            records = records.len(),
            dropped = skipped_rows.len(),
            "sheet normalized"
        );

        SheetImportReport {
            batch_id: batch_id.to_string(),
            sheet_name: sheet.sheet_name.clone(),
            matched_fields: assignment.iter().map(|(f, _)| f.to_string()).collect(),
            records,
            skipped_rows,
        }
    }

    /// Parse a workbook or CSV file and normalize every sheet under one batch id.
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<SheetImportReport>> {
        let sheets = self.file_parser.parse_sheets(file_path.as_ref())?;
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, sheets = sheets.len(), "workbook parsed");

        Ok(sheets
            .iter()
            .map(|sheet| self.normalize_with_batch(sheet, &batch_id))
            .collect())
    }
}

impl Default for SheetImporter {
    fn default() -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapper),
            Box::new(RecordBuilder::new()),
            Box::new(DqValidator),
        )
    }
}

impl SheetNormalizer for SheetImporter {
    fn normalize_and_build(&self, sheet: &RawSheet) -> SheetImportReport {
        let batch_id = Uuid::new_v4().to_string();
        self.normalize_with_batch(sheet, &batch_id)
    }
}

// ==========================================
// NCIP Registry Import - Document builder
// ==========================================
// Role: one data row + field assignment → CanonicalRecord
// Steps: sheet metadata → coerce matched fields → resolve combined
//        icc/location column → derive lists → applicant/project backfill
// Red line: region comes from the sheet name only
// ==========================================

use crate::domain::CanonicalRecord;
use crate::importer::cell_splitter::IccLocationSplitter;
use crate::importer::data_cleaner::{split_comma_list, DataCleaner, TypedValue};
use crate::importer::field_mapper::FieldAssignment;
use crate::importer::field_registry::FieldName;
use crate::importer::importer_trait::{CellSplitter, DocumentBuilder, ValueCoercer};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

// "REGION 1", "Region IV-A", "R12", "R 4B"
static REGION_SHEET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:REGION|R)\s*-?\s*((?:\d+|[IVX]+)(?:\s*-?\s*[AB])?)$")
        .expect("invalid region sheet regex")
});

/// Derive the region from a regional workbook's sheet name.
///
/// Unrecognised names yield an empty region.
pub fn region_from_sheet_name(sheet_name: &str) -> String {
    let name = sheet_name.trim();
    if name.eq_ignore_ascii_case("CAR") {
        return "CAR".to_string();
    }
    REGION_SHEET
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            let number: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            format!("Region {}", number.to_uppercase())
        })
        .unwrap_or_default()
}

// ==========================================
// RecordBuilder - DocumentBuilder implementation
// ==========================================
pub struct RecordBuilder {
    coercer: DataCleaner,
    splitter: IccLocationSplitter,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            coercer: DataCleaner,
            splitter: IccLocationSplitter::new(),
        }
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder for RecordBuilder {
    fn build(
        &self,
        row: &[String],
        assignment: &FieldAssignment,
        sheet_name: &str,
        batch_id: &str,
    ) -> CanonicalRecord {
        let mut record = CanonicalRecord {
            region: region_from_sheet_name(sheet_name),
            source_sheet: sheet_name.to_string(),
            import_batch_id: (!batch_id.is_empty()).then(|| batch_id.to_string()),
            imported_at: Some(Utc::now()),
            ..Default::default()
        };

        let combined = assignment.combined_icc_location();
        let cell = |column: usize| row.get(column).map(String::as_str).unwrap_or("");

        for (field, column) in assignment.iter() {
            if combined == Some(column) && matches!(field, FieldName::Icc | FieldName::Location) {
                continue;
            }
            let value = self.coercer.coerce(field, cell(column));
            set_field(&mut record, field, value);
        }

        if let Some(column) = combined {
            let split = self.splitter.split_combined(cell(column));
            record.icc = split.icc;
            record.location = split.location;
        }

        if record.municipalities.is_empty() && !record.municipality.is_empty() {
            record.municipalities = split_comma_list(&record.municipality);
        }
        if record.barangays.is_empty() && !record.barangay.is_empty() {
            record.barangays = split_comma_list(&record.barangay);
        }

        // regional sheets interchange the community name and the project name
        if record.applicant_proponent.is_empty() && !record.name_of_project.is_empty() {
            record.applicant_proponent = record.name_of_project.clone();
        }
        if record.name_of_project.is_empty() && !record.applicant_proponent.is_empty() {
            record.name_of_project = record.applicant_proponent.clone();
        }

        record
    }
}

fn set_field(record: &mut CanonicalRecord, field: FieldName, value: TypedValue) {
    match field {
        FieldName::ControlNumber => record.control_number = value.into_text(),
        FieldName::SurveyNumber => record.survey_number = value.into_text(),
        FieldName::ApplicantProponent => record.applicant_proponent = value.into_text(),
        FieldName::NameOfProject => record.name_of_project = value.into_text(),
        FieldName::NatureOfProject => record.nature_of_project = value.into_text(),
        FieldName::ProjectCost => record.project_cost = value.into_text(),
        FieldName::Location => record.location = value.into_text(),
        FieldName::Province => record.province = value.into_text(),
        FieldName::Municipality => record.municipality = value.into_text(),
        FieldName::Barangay => record.barangay = value.into_text(),
        FieldName::CadtStatus => record.cadt_status = value.into_text(),
        FieldName::YearApproved => record.year_approved = value.into_text(),
        FieldName::MoaDuration => record.moa_duration = value.into_text(),
        FieldName::CommunityBenefits => record.community_benefits = value.into_text(),
        FieldName::Remarks => record.remarks = value.into_text(),
        FieldName::TotalArea => record.total_area = value.as_number(),
        FieldName::Icc => record.icc = value.into_list(),
        FieldName::Municipalities => record.municipalities = value.into_list(),
        FieldName::Barangays => record.barangays = value.into_list(),
        FieldName::ImportedAt => {
            if let TypedValue::Timestamp(Some(ts)) = value {
                record.imported_at = Some(ts);
            }
        }
    }
}

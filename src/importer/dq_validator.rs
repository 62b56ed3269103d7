// ==========================================
// NCIP Registry Import - Row validator
// ==========================================
// Rule: a row must carry at least one identifying field
// Invalid rows are dropped before batching, never reconciled
// ==========================================

use crate::domain::CanonicalRecord;
use crate::importer::importer_trait::RowValidator;

pub struct DqValidator;

impl RowValidator for DqValidator {
    fn is_valid(&self, record: &CanonicalRecord) -> bool {
        [
            &record.control_number,
            &record.survey_number,
            &record.applicant_proponent,
            &record.name_of_project,
        ]
        .iter()
        .any(|v| !v.trim().is_empty())
    }
}

// ==========================================
// NCIP Registry Import - Canonical record model
// ==========================================
// Role: the unit persisted and displayed, independent of source sheet layout
// Lifecycle: built once per import row, immutable until reconciled
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CanonicalRecord - normalized imported row
// ==========================================
// Red line: list fields are never absent, empty list is the "no data" state
// Red line: total_area >= 0 and never NaN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanonicalRecord {
    // ===== Identity =====
    pub control_number: String,
    pub survey_number: String,

    // ===== Geography =====
    pub region: String,
    pub province: String,
    pub municipality: String,          // scalar source text, comma-separated
    pub municipalities: Vec<String>,   // selection order preserved
    pub barangay: String,
    pub barangays: Vec<String>,
    pub location: String,

    // ===== Project metadata =====
    pub applicant_proponent: String,
    pub name_of_project: String,
    pub nature_of_project: String,
    pub project_cost: String,
    pub cadt_status: String,
    pub year_approved: String,
    pub moa_duration: String,
    pub community_benefits: String,
    pub remarks: String,

    // ===== Classification =====
    pub icc: Vec<String>,

    // ===== Numeric =====
    pub total_area: f64,

    // ===== Provenance =====
    pub source_sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_batch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ongoing_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_partition: Option<String>,

    // ===== Ownership =====
    pub owner_id: String,
}

impl CanonicalRecord {
    /// Natural dedup key: trimmed, lower-cased survey number.
    ///
    /// Falls back to the control number when the survey number is blank,
    /// since regional sheets file the same identifier under either heading.
    /// Returns `None` when neither carries a value.
    pub fn natural_key(&self) -> Option<String> {
        [&self.survey_number, &self.control_number]
            .into_iter()
            .map(|v| v.trim().to_lowercase())
            .find(|v| !v.is_empty())
    }

    pub fn is_ongoing(&self) -> bool {
        self.ongoing_flag == Some(true)
    }
}

// ==========================================
// StoredRecord - persisted entity
// ==========================================
// id is assigned by the store and survives in-place updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: CanonicalRecord,
}

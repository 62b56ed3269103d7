// ==========================================
// NCIP Registry Import - Stored document aliases
// ==========================================
// Role: fixed rename table for downstream consumers that still read
//       legacy field names (snake_case originals, short names)
// Applied on write after all derivation; resolved back on read
// ==========================================

use serde_json::{Map, Value};

/// canonical camelCase name → legacy names written alongside it
pub const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("controlNumber", &["control_number"]),
    ("surveyNumber", &["survey_number"]),
    (
        "applicantProponent",
        &["applicant_proponent", "applicant", "proponent"],
    ),
    ("nameOfProject", &["name_of_project", "projectName"]),
    ("natureOfProject", &["nature_of_project", "nature"]),
    ("projectCost", &["project_cost"]),
    ("cadtStatus", &["cadt_status", "cadt"]),
    ("icc", &["affectedICC"]),
    ("yearApproved", &["year_approved", "year"]),
    ("moaDuration", &["moa_duration"]),
    ("communityBenefits", &["community_benefits"]),
    ("totalArea", &["total_area"]),
    ("sourceSheet", &["source_sheet"]),
    ("importBatchId", &["import_batch_id"]),
    ("importedAt", &["imported_at"]),
    ("ongoingFlag", &["_ongoing"]),
    ("importPartition", &["importCollection", "import_collection"]),
];

/// Copy every canonical value under its legacy names.
pub fn apply_aliases(doc: &mut Map<String, Value>) {
    for (canonical, aliases) in FIELD_ALIASES {
        if let Some(value) = doc.get(*canonical).cloned() {
            for alias in *aliases {
                doc.insert((*alias).to_string(), value.clone());
            }
        }
    }
}

/// Fold legacy names back into canonical ones; canonical keys win.
pub fn resolve_aliases(doc: &mut Map<String, Value>) {
    for (canonical, aliases) in FIELD_ALIASES {
        for alias in *aliases {
            if let Some(value) = doc.remove(*alias) {
                if !doc.contains_key(*canonical) && !value.is_null() {
                    doc.insert((*canonical).to_string(), value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalRecord;
    use serde_json::json;

    #[test]
    fn test_apply_aliases_duplicates_values() {
        let mut doc = json!({ "applicantProponent": "Apo Mining", "icc": ["Ayta"] })
            .as_object()
            .cloned()
            .unwrap();
        apply_aliases(&mut doc);

        assert_eq!(doc["applicant"], json!("Apo Mining"));
        assert_eq!(doc["proponent"], json!("Apo Mining"));
        assert_eq!(doc["affectedICC"], json!(["Ayta"]));
        assert!(!doc.contains_key("cadt"));
    }

    #[test]
    fn test_aliased_document_reads_back_as_record() {
        let mut record = CanonicalRecord::default();
        record.survey_number = "ADs-01".to_string();
        record.cadt_status = "Approved".to_string();

        let mut doc = serde_json::to_value(&record).unwrap().as_object().cloned().unwrap();
        apply_aliases(&mut doc);
        resolve_aliases(&mut doc);

        let back: CanonicalRecord = serde_json::from_value(Value::Object(doc)).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_legacy_only_document_resolves() {
        let mut doc = json!({
            "survey_number": "R1-07",
            "name_of_project": "Road widening",
            "total_area": 12.5,
            "affectedICC": ["Isneg"]
        })
        .as_object()
        .cloned()
        .unwrap();
        resolve_aliases(&mut doc);

        let record: CanonicalRecord = serde_json::from_value(Value::Object(doc)).unwrap();
        assert_eq!(record.survey_number, "R1-07");
        assert_eq!(record.name_of_project, "Road widening");
        assert_eq!(record.total_area, 12.5);
        assert_eq!(record.icc, vec!["Isneg".to_string()]);
    }
}

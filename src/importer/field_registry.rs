// ==========================================
// NCIP Registry Import - Target field registry
// ==========================================
// Role: plain data, target field → known header variants
// Red line: region is never matched from a column, it comes from the sheet name
// Matching algorithm lives in field_mapper.rs
// ==========================================

use crate::domain::types::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// FieldName - every field a column can feed
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    ControlNumber,
    SurveyNumber,
    ApplicantProponent,
    NameOfProject,
    NatureOfProject,
    ProjectCost,
    Location,
    Province,
    Municipality,
    Barangay,
    CadtStatus,
    Icc,
    YearApproved,
    MoaDuration,
    CommunityBenefits,
    TotalArea,
    Remarks,
    // derived, never matched directly
    Municipalities,
    Barangays,
    ImportedAt,
}

impl FieldName {
    /// Semantic type used by the value coercer.
    pub fn field_type(self) -> FieldType {
        match self {
            FieldName::Icc | FieldName::Municipalities | FieldName::Barangays => {
                FieldType::TextList
            }
            FieldName::TotalArea => FieldType::Number,
            FieldName::ImportedAt => FieldType::Timestamp,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::ControlNumber => "controlNumber",
            FieldName::SurveyNumber => "surveyNumber",
            FieldName::ApplicantProponent => "applicantProponent",
            FieldName::NameOfProject => "nameOfProject",
            FieldName::NatureOfProject => "natureOfProject",
            FieldName::ProjectCost => "projectCost",
            FieldName::Location => "location",
            FieldName::Province => "province",
            FieldName::Municipality => "municipality",
            FieldName::Barangay => "barangay",
            FieldName::CadtStatus => "cadtStatus",
            FieldName::Icc => "icc",
            FieldName::YearApproved => "yearApproved",
            FieldName::MoaDuration => "moaDuration",
            FieldName::CommunityBenefits => "communityBenefits",
            FieldName::TotalArea => "totalArea",
            FieldName::Remarks => "remarks",
            FieldName::Municipalities => "municipalities",
            FieldName::Barangays => "barangays",
            FieldName::ImportedAt => "importedAt",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Header variants, in matching order
// ==========================================
// Order matters twice: fields are matched top to bottom, and within a field
// earlier variants are tried first. Variants are stored raw and normalized
// by the matcher.
pub const HEADER_VARIANTS: &[(FieldName, &[&str])] = &[
    (
        FieldName::ControlNumber,
        &[
            "cadt calt no", // "CADT/CALT NO." in NCIP sheets
            "cadt no",
            "calt no",
            "cadt calt number",
            "cadt number",
            "calt number",
            "control number", // mining sheets
            "control no",
            "control",
        ],
    ),
    (
        FieldName::SurveyNumber,
        &[
            "survey no",
            "survey number",
            "eccv no",
            "eccv number",
            "petition no",
            "petition number",
        ],
    ),
    (
        FieldName::ApplicantProponent,
        &[
            "applicant/proponent",
            "applicant proponent",
            "applicant",
            "proponent",
            "company",
            "company name",
            "representative",
            "claimant representative",
        ],
    ),
    (
        FieldName::NameOfProject,
        &[
            "name of project",
            "project name",
            "project",
            "name of ads iccs ips", // community name in NCIP sheets
            "name of ads",
            "name of iccs ips",
        ],
    ),
    (
        FieldName::NatureOfProject,
        &["nature of project", "nature", "project type"],
    ),
    (
        FieldName::ProjectCost,
        &["project cost", "cost", "total project cost"],
    ),
    (FieldName::Location, &["location", "icc location"]),
    (FieldName::Province, &["province", "provinces"]),
    (
        FieldName::Municipality,
        &["municipality", "municipalities", "municipal"],
    ),
    (FieldName::Barangay, &["barangay", "barangays", "brgy"]),
    (
        FieldName::CadtStatus,
        &[
            "cadt status",
            "cadt",
            "type cadt calt", // "TYPE\n(CADT/CALT)"
            "type",
            "cadt type",
            "calt type",
            "status",
        ],
    ),
    (
        FieldName::Icc,
        &[
            "icc",
            "iccs",
            "iccs ips",
            "icc ips",
            "icc ip",
            "per ip group",
            "ip group",
        ],
    ),
    (
        FieldName::YearApproved,
        &["year approved", "date approved", "year"],
    ),
    (
        FieldName::MoaDuration,
        &["moa duration", "moa", "duration", "memorandum duration"],
    ),
    (
        FieldName::CommunityBenefits,
        &[
            "community benefits",
            "community benefit",
            "benefits",
            "benefits to community",
        ],
    ),
    (
        FieldName::TotalArea,
        &[
            "total area",
            "area",
            "area hectares",
            "area hectares land",
            "area ha",
        ],
    ),
    (
        FieldName::Remarks,
        &["remarks", "remark", "notes", "ado remarks status"],
    ),
];

// ==========================================
// Fallback probes
// ==========================================
// Applied only to fields still unmatched after the primary pass.
// Single-word probes match a header word by prefix ("loc" → "loc.",
// "ip" → "ips"); multi-word probes match as a plain substring.
pub const FALLBACK_PROBES: &[(FieldName, &[&str])] = &[
    (FieldName::Location, &["location", "loc"]),
    (FieldName::Icc, &["icc", "ip", "ip group"]),
    (FieldName::ProjectCost, &["cost", "project cost", "total cost"]),
    (
        FieldName::ApplicantProponent,
        &["applicant", "proponent", "claimant"],
    ),
];

/// Variants registered for a field, empty for derived fields.
pub fn variants_for(field: FieldName) -> &'static [&'static str] {
    HEADER_VARIANTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, variants)| *variants)
        .unwrap_or(&[])
}

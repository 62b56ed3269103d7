// ==========================================
// NCIP Registry Import - Value coercer
// ==========================================
// Role: raw cell text → typed value for the target field
// Contract: deterministic and total; malformed cells degrade to empty/zero
// ==========================================

use crate::domain::types::FieldType;
use crate::importer::field_registry::FieldName;
use crate::importer::importer_trait::ValueCoercer;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// ICC cells hold slash-joined compound names, so "and" stays inside a name
static ICC_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;/|]").expect("invalid icc separator regex"));

static LIST_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,;/|]|\band\b").expect("invalid list separator regex")
});

// ==========================================
// TypedValue - coercion output
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl TypedValue {
    pub fn into_text(self) -> String {
        match self {
            TypedValue::Text(s) => s,
            TypedValue::Number(n) => n.to_string(),
            TypedValue::List(items) => items.join(", "),
            TypedValue::Timestamp(ts) => ts.map(|t| t.to_rfc3339()).unwrap_or_default(),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            TypedValue::List(items) => items,
            TypedValue::Text(s) if s.is_empty() => Vec::new(),
            TypedValue::Text(s) => vec![s],
            _ => Vec::new(),
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            TypedValue::Number(n) => *n,
            _ => 0.0,
        }
    }
}

// ==========================================
// DataCleaner - ValueCoercer implementation
// ==========================================
pub struct DataCleaner;

impl ValueCoercer for DataCleaner {
    fn coerce(&self, field: FieldName, raw: &str) -> TypedValue {
        let value = raw.trim();
        let field_type = field.field_type();

        if is_canonical_empty(value) {
            return match field_type {
                FieldType::TextList => TypedValue::List(Vec::new()),
                FieldType::Number => TypedValue::Number(0.0),
                FieldType::Timestamp => TypedValue::Timestamp(None),
                FieldType::Text => TypedValue::Text(String::new()),
            };
        }

        match field_type {
            FieldType::Number => TypedValue::Number(parse_number(value)),
            FieldType::TextList if field == FieldName::Icc => {
                TypedValue::List(split_list(value, &ICC_SEPARATORS))
            }
            FieldType::TextList => TypedValue::List(split_list(value, &LIST_SEPARATORS)),
            FieldType::Timestamp => TypedValue::Timestamp(parse_timestamp(value)),
            FieldType::Text => TypedValue::Text(value.to_string()),
        }
    }
}

/// Empty string and the literal "void" (any case) both mean no data.
pub fn is_canonical_empty(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("void")
}

/// Strip thousands separators and parse; anything unusable becomes 0.
///
/// Negative areas are clamped so stored values stay non-negative.
pub fn parse_number(value: &str) -> f64 {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n,
        _ => 0.0,
    }
}

fn split_list(value: &str, separators: &Regex) -> Vec<String> {
    separators
        .split(value)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split scalar municipality/barangay text on commas only.
pub fn split_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_void_by_type() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.coerce(FieldName::Icc, ""), TypedValue::List(vec![]));
        assert_eq!(cleaner.coerce(FieldName::Icc, " VOID "), TypedValue::List(vec![]));
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "void"), TypedValue::Number(0.0));
        assert_eq!(
            cleaner.coerce(FieldName::Remarks, "Void"),
            TypedValue::Text(String::new())
        );
    }

    #[test]
    fn test_number_coercion() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "1,234.5"), TypedValue::Number(1234.5));
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "n/a"), TypedValue::Number(0.0));
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "NaN"), TypedValue::Number(0.0));
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "inf"), TypedValue::Number(0.0));
        assert_eq!(cleaner.coerce(FieldName::TotalArea, "-12"), TypedValue::Number(0.0));
    }

    #[test]
    fn test_icc_keeps_and_inside_names() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.coerce(FieldName::Icc, "Ayta/Aeta; Iraya and Alangan | Hanunuo,"),
            TypedValue::List(vec![
                "Ayta".to_string(),
                "Aeta".to_string(),
                "Iraya and Alangan".to_string(),
                "Hanunuo".to_string(),
            ])
        );
    }

    #[test]
    fn test_generic_list_splits_on_and() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.coerce(FieldName::Barangays, "Tubo-Tubo AND Sapang Bato; Bangal"),
            TypedValue::List(vec![
                "Tubo-Tubo".to_string(),
                "Sapang Bato".to_string(),
                "Bangal".to_string(),
            ])
        );
        // "and" inside a word is not a separator
        assert_eq!(
            cleaner.coerce(FieldName::Municipalities, "Sandoval"),
            TypedValue::List(vec!["Sandoval".to_string()])
        );
    }

    #[test]
    fn test_text_is_trimmed_only() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.coerce(FieldName::ProjectCost, "  PHP 1,000,000 "),
            TypedValue::Text("PHP 1,000,000".to_string())
        );
    }

    #[test]
    fn test_timestamp_coercion() {
        let cleaner = DataCleaner;
        match cleaner.coerce(FieldName::ImportedAt, "2024-03-01") {
            TypedValue::Timestamp(Some(ts)) => assert_eq!(ts.to_rfc3339(), "2024-03-01T00:00:00+00:00"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            cleaner.coerce(FieldName::ImportedAt, "yesterday"),
            TypedValue::Timestamp(None)
        );
    }

    #[test]
    fn test_split_comma_list() {
        assert_eq!(
            split_comma_list("Dinalupihan, Hermosa ,,"),
            vec!["Dinalupihan".to_string(), "Hermosa".to_string()]
        );
    }
}

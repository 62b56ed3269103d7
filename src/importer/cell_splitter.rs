// ==========================================
// NCIP Registry Import - Combined icc/location splitter
// ==========================================
// Role: resolve a column assigned to both icc and location
// Heuristic: location markers decide the break; ambiguous cells degrade
//            to "whole cell is icc"
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_registry::FieldName;
use crate::importer::importer_trait::{CellSplitter, ValueCoercer};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SEGMENT_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n|\s{2,}| - |;|\|").expect("invalid segment regex"));

static LOCATION_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)barangay|brgy|municipal|province|city|town|sitio")
        .expect("invalid location marker regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SplitCell {
    pub icc: Vec<String>,
    pub location: String,
}

pub struct IccLocationSplitter {
    coercer: DataCleaner,
}

impl IccLocationSplitter {
    pub fn new() -> Self {
        Self {
            coercer: DataCleaner,
        }
    }

    fn icc_list(&self, text: &str) -> Vec<String> {
        self.coercer.coerce(FieldName::Icc, text).into_list()
    }
}

impl Default for IccLocationSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CellSplitter for IccLocationSplitter {
    fn split_combined(&self, cell: &str) -> SplitCell {
        let segments: Vec<&str> = SEGMENT_BREAKS
            .split(cell.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if segments.len() < 2 {
            return SplitCell {
                icc: self.icc_list(cell),
                location: String::new(),
            };
        }

        // last segment carrying a marker starts the location part
        match segments.iter().rposition(|s| LOCATION_MARKERS.is_match(s)) {
            Some(start) => SplitCell {
                icc: self.icc_list(&segments[..start].join(", ")),
                location: segments[start..].join(", "),
            },
            None => SplitCell {
                icc: self.icc_list(segments[0]),
                location: segments[1..].join(", "),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_newline_with_marker() {
        let splitter = IccLocationSplitter::new();
        let split =
            splitter.split_combined("AYTA AMBALA\nBarangay Tubo-Tubo, Dinalupihan, Bataan");

        assert_eq!(split.icc, vec!["AYTA AMBALA".to_string()]);
        assert_eq!(split.location, "Barangay Tubo-Tubo, Dinalupihan, Bataan");
    }

    #[test]
    fn test_marker_scan_starts_from_last_segment() {
        let splitter = IccLocationSplitter::new();
        let split = splitter
            .split_combined("Iraya; Alangan - Sitio Bayanan; Mun. of Baco | Province of Mindoro");

        assert_eq!(
            split.icc,
            vec![
                "Iraya".to_string(),
                "Alangan".to_string(),
                "Sitio Bayanan".to_string(),
                "Mun. of Baco".to_string(),
            ]
        );
        assert_eq!(split.location, "Province of Mindoro");
    }

    #[test]
    fn test_no_marker_first_segment_is_icc() {
        let splitter = IccLocationSplitter::new();
        let split = splitter.split_combined("Mangyan  Oriental Mindoro");

        assert_eq!(split.icc, vec!["Mangyan".to_string()]);
        assert_eq!(split.location, "Oriental Mindoro");
    }

    #[test]
    fn test_single_segment_is_all_icc() {
        let splitter = IccLocationSplitter::new();
        let split = splitter.split_combined("Kankanaey/Ibaloi");

        assert_eq!(split.icc, vec!["Kankanaey".to_string(), "Ibaloi".to_string()]);
        assert!(split.location.is_empty());
    }

    #[test]
    fn test_empty_cell() {
        let splitter = IccLocationSplitter::new();
        assert_eq!(splitter.split_combined("   "), SplitCell::default());
        assert_eq!(splitter.split_combined("void"), SplitCell::default());
    }
}

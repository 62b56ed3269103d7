// ==========================================
// NCIP Registry Import - Field matcher
// ==========================================
// Role: source headers → target field column indexes
// Strategy: ordered rule list, each rule a pure predicate over two
//           normalized strings; registry data lives in field_registry.rs
// ==========================================

use crate::importer::field_registry::{FieldName, FALLBACK_PROBES, HEADER_VARIANTS};
use crate::importer::header_normalizer::{compact, normalize_header};
use crate::importer::importer_trait::HeaderMatcher;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// MatchRule - one layer of the matching strategy
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Normalized header equals the normalized variant.
    Exact,
    /// Equal once all internal spaces are removed.
    Compact,
    /// Multi-word variant appears inside a verbose header.
    VariantInHeader,
    /// Header longer than 3 characters appears inside a variant.
    HeaderInVariant,
}

/// Rules in priority order. A field takes the first column satisfying the
/// earliest rule, so a strong match anywhere beats a weak match earlier.
pub const MATCH_RULES: [MatchRule; 4] = [
    MatchRule::Exact,
    MatchRule::Compact,
    MatchRule::VariantInHeader,
    MatchRule::HeaderInVariant,
];

impl MatchRule {
    /// Both arguments must already be normalized.
    pub fn matches(self, header: &str, variant: &str) -> bool {
        if header.is_empty() || variant.is_empty() {
            return false;
        }
        match self {
            MatchRule::Exact => header == variant,
            MatchRule::Compact => compact(header) == compact(variant),
            // the contained side carries the length guard: "no" must not hit "petition no"
            MatchRule::VariantInHeader => {
                variant.split_whitespace().count() > 1 && header.contains(variant)
            }
            MatchRule::HeaderInVariant => header.chars().count() > 3 && variant.contains(header),
        }
    }
}

// ==========================================
// FieldAssignment - resolved field → column map
// ==========================================
// One physical column may feed two logical fields (icc + location)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldAssignment {
    columns: BTreeMap<FieldName, usize>,
}

impl FieldAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a column unless the field already has one; first match wins.
    pub fn assign(&mut self, field: FieldName, column: usize) -> bool {
        if self.columns.contains_key(&field) {
            return false;
        }
        self.columns.insert(field, column);
        true
    }

    pub fn column(&self, field: FieldName) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, usize)> + '_ {
        self.columns.iter().map(|(field, column)| (*field, *column))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column shared by icc and location, when the sheet authored both in one cell.
    pub fn combined_icc_location(&self) -> Option<usize> {
        match (self.column(FieldName::Icc), self.column(FieldName::Location)) {
            (Some(icc), Some(location)) if icc == location => Some(icc),
            _ => None,
        }
    }
}

// ==========================================
// FieldMapper - HeaderMatcher implementation
// ==========================================
pub struct FieldMapper;

impl HeaderMatcher for FieldMapper {
    fn match_fields(&self, headers: &[String]) -> FieldAssignment {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut assignment = FieldAssignment::new();

        // primary pass: field by field, rule by rule
        for (field, variants) in HEADER_VARIANTS {
            let variants: Vec<String> = variants.iter().map(|v| normalize_header(v)).collect();

            let hit = MATCH_RULES.iter().find_map(|rule| {
                normalized
                    .iter()
                    .position(|header| variants.iter().any(|v| rule.matches(header, v)))
                    .map(|column| (*rule, column))
            });

            if let Some((rule, column)) = hit {
                assignment.assign(*field, column);
                debug!(field = %field, column, header = %headers[column], ?rule, "field matched");
            }
        }

        // fallback probes for high-value fields still missing
        for (field, probes) in FALLBACK_PROBES {
            if assignment.contains(*field) {
                continue;
            }
            if let Some(column) = normalized
                .iter()
                .position(|header| probes.iter().any(|p| probe_matches(header, p)))
            {
                assignment.assign(*field, column);
                debug!(field = %field, column, header = %headers[column], "field matched by fallback probe");
            }
        }

        debug!(
            matched = assignment.len(),
            available = HEADER_VARIANTS.len(),
            "header matching finished"
        );
        assignment
    }
}

fn probe_matches(header: &str, probe: &str) -> bool {
    if probe.contains(' ') {
        header.contains(probe)
    } else {
        header.split_whitespace().any(|word| word.starts_with(probe))
    }
}

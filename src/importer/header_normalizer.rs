// ==========================================
// NCIP Registry Import - Header normalizer
// ==========================================
// Role: canonicalize raw header text before matching
// Contract: pure, total, idempotent
// ==========================================

/// Normalize a header for matching.
///
/// Lower-cases, turns non-breaking spaces and line breaks into spaces,
/// strips quote characters, treats slashes and every other non-word
/// character as a space, collapses whitespace runs and trims.
///
/// # Examples
/// - `"CADT/CALT NO."` → `"cadt calt no"`
/// - `"AREA (Hectares)\nLAND"` → `"area hectares land"`
pub fn normalize_header(header: &str) -> String {
    let mut cleaned = String::with_capacity(header.len());

    for ch in header.chars().flat_map(char::to_lowercase) {
        match ch {
            // quotes vanish without leaving a gap: "Applicant's" → "applicants"
            '"' | '\'' | '`' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' => {}
            c if c.is_alphanumeric() || c == '_' => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Header with all internal spaces removed, for the compact match rule.
pub fn compact(normalized: &str) -> String {
    normalized.chars().filter(|c| !c.is_whitespace()).collect()
}

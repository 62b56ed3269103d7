// ==========================================
// NCIP Registry Import - Partition naming
// ==========================================
// Role: turn a user-supplied label into a store-safe partition name
// Format: <prefix><label>, or <prefix>YYYYMMDD_HHMMSS when no label is given
// Collision: <name>_YYYYMMDD_HHMMSS, then <name>_YYYYMMDD_HHMMSS_<n>
// ==========================================

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid partition regex"));

/// `<prefix>YYYYMMDD_HHMMSS` in UTC.
pub fn generate_partition_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// Sanitize a user-supplied label.
///
/// Runs of characters outside `[A-Za-z0-9_-]` collapse into a single `_`,
/// leading and trailing underscores are dropped and the prefix is prepended
/// unless already present. Returns `None` when nothing usable is left.
pub fn sanitize_partition_name(raw: &str, prefix: &str) -> Option<String> {
    let replaced = UNSAFE_CHARS.replace_all(raw.trim(), "_");
    let cleaned = replaced.trim_matches('_');
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.starts_with(prefix) {
        Some(cleaned.to_string())
    } else {
        Some(format!("{}{}", prefix, cleaned))
    }
}

/// Sanitized label if one is given and usable, generated name otherwise.
pub fn resolve_partition_name(raw: Option<&str>, prefix: &str, now: DateTime<Utc>) -> String {
    raw.and_then(|label| sanitize_partition_name(label, prefix))
        .unwrap_or_else(|| generate_partition_name(prefix, now))
}

/// Alternative for a name that is already in use; `attempt` starts at 1.
///
/// The first alternative appends the run timestamp, later ones a counter.
/// A generated name already ends with the timestamp and goes straight to the counter.
pub fn disambiguate_partition_name(base: &str, now: DateTime<Utc>, attempt: usize) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    if base.ends_with(&stamp) {
        return format!("{}_{}", base, attempt + 1);
    }

    let stamped = format!("{}_{}", base, stamp);
    if attempt <= 1 {
        stamped
    } else {
        format!("{}_{}", stamped, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_generated_name_uses_timestamp() {
        assert_eq!(
            generate_partition_name("import_", fixed_now()),
            "import_20240309_140507"
        );
    }

    #[test]
    fn test_sanitize_replaces_unsafe_runs() {
        assert_eq!(
            sanitize_partition_name("  Region 4A / March batch ", "import_"),
            Some("import_Region_4A_March_batch".to_string())
        );
        assert_eq!(
            sanitize_partition_name("import_car-2024", "import_"),
            Some("import_car-2024".to_string())
        );
    }

    #[test]
    fn test_unusable_label_falls_back_to_generated() {
        assert_eq!(sanitize_partition_name(" /// ", "import_"), None);
        assert_eq!(
            resolve_partition_name(Some("***"), "import_", fixed_now()),
            "import_20240309_140507"
        );
        assert_eq!(
            resolve_partition_name(None, "import_", fixed_now()),
            "import_20240309_140507"
        );
        assert_eq!(
            resolve_partition_name(Some("ongoing"), "import_", fixed_now()),
            "import_ongoing"
        );
    }

    #[test]
    fn test_taken_name_gets_timestamp_then_counter() {
        let now = fixed_now();
        assert_eq!(
            disambiguate_partition_name("import_batch", now, 1),
            "import_batch_20240309_140507"
        );
        assert_eq!(
            disambiguate_partition_name("import_batch", now, 2),
            "import_batch_20240309_140507_2"
        );
        assert_eq!(
            disambiguate_partition_name("import_20240309_140507", now, 1),
            "import_20240309_140507_2"
        );
        assert_eq!(
            disambiguate_partition_name("import_20240309_140507", now, 2),
            "import_20240309_140507_3"
        );
    }
}

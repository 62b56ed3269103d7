// ==========================================
// NCIP Registry Import - Domain types
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Reconciliation mode
// ==========================================
// Selected per import run; governs how incoming records meet persisted ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportMode {
    Append,       // dedup by natural key, update in place or create
    Replace,      // delete the owner's records, then create everything
    NewPartition, // write into a fresh named partition
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Append => write!(f, "APPEND"),
            ImportMode::Replace => write!(f, "REPLACE"),
            ImportMode::NewPartition => write!(f, "NEW_PARTITION"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "append" => Ok(ImportMode::Append),
            "replace" => Ok(ImportMode::Replace),
            "new-partition" | "partition" | "new" => Ok(ImportMode::NewPartition),
            other => Err(format!("unknown import mode: {}", other)),
        }
    }
}

// ==========================================
// Field semantic type
// ==========================================
// Drives value coercion; see importer::data_cleaner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    TextList,
    Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_mode_from_str() {
        assert_eq!("append".parse::<ImportMode>(), Ok(ImportMode::Append));
        assert_eq!("REPLACE".parse::<ImportMode>(), Ok(ImportMode::Replace));
        assert_eq!(
            "new_partition".parse::<ImportMode>(),
            Ok(ImportMode::NewPartition)
        );
        assert!("merge".parse::<ImportMode>().is_err());
    }
}

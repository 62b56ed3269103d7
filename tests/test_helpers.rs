// ==========================================
// Test helpers
// ==========================================
// Temporary databases, config overrides and CSV fixtures
// ==========================================

#![allow(dead_code)]

use ncip_import::config::ConfigManager;
use ncip_import::db;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// Create a temporary database with the schema applied.
///
/// # Returns
/// - NamedTempFile: keep it alive for the duration of the test
/// - String: database path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// Write a global config override.
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let config = ConfigManager::new(db_path).map_err(|e| e.to_string())?;
    config
        .set_global_config_value(key, value)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Write `content` to `<dir>/<file_name>` and return the path.
pub fn write_csv(dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Owned strings from literals.
pub fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

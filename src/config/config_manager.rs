// ==========================================
// NCIP Registry Import - Configuration manager
// ==========================================
// Role: load and override import configuration
// Storage: config_kv table (key-value + scope), built-in defaults otherwise
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open the database at `db_path`.
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection; PRAGMAs are re-applied (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock acquisition failed: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Read a value from config_kv (scope_id='global').
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("lock acquisition failed: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Upsert a global value.
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("lock acquisition failed: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// Snapshot of every global value, as JSON.
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("lock acquisition failed: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// ImportConfigReader implementation
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_default_collection(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(
            config_keys::DEFAULT_COLLECTION,
            config_defaults::DEFAULT_COLLECTION,
        )?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(config_defaults::DEFAULT_COLLECTION.to_string());
        }
        Ok(trimmed.to_string())
    }

    async fn get_partition_prefix(&self) -> ConfigResult<String> {
        self.get_config_or_default(
            config_keys::PARTITION_PREFIX,
            config_defaults::PARTITION_PREFIX,
        )
    }

    async fn get_allow_partition_collections(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::ALLOW_PARTITION_COLLECTIONS, "true")?;
        match value.trim().to_lowercase().as_str() {
            "false" | "0" | "no" | "off" => Ok(false),
            "true" | "1" | "yes" | "on" => Ok(true),
            other => {
                tracing::warn!(
                    config_key = config_keys::ALLOW_PARTITION_COLLECTIONS,
                    raw_value = %other,
                    "unrecognised boolean, using default"
                );
                Ok(config_defaults::ALLOW_PARTITION_COLLECTIONS)
            }
        }
    }

    async fn get_ongoing_status_keywords(&self) -> ConfigResult<Vec<String>> {
        let value = match self.get_config_value(config_keys::ONGOING_STATUS_KEYWORDS)? {
            Some(v) => v,
            None => {
                return Ok(config_defaults::ONGOING_STATUS_KEYWORDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect())
            }
        };

        Ok(value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // collections
    pub const DEFAULT_COLLECTION: &str = "default_collection";
    pub const PARTITION_PREFIX: &str = "partition_prefix";
    pub const ALLOW_PARTITION_COLLECTIONS: &str = "allow_partition_collections";

    // ongoing working set, comma-separated
    pub const ONGOING_STATUS_KEYWORDS: &str = "ongoing_status_keywords";
}

// ==========================================
// Built-in defaults
// ==========================================
pub mod config_defaults {
    pub const DEFAULT_COLLECTION: &str = "mappings";
    pub const PARTITION_PREFIX: &str = "import_";
    pub const ALLOW_PARTITION_COLLECTIONS: bool = true;
    pub const ONGOING_STATUS_KEYWORDS: &[&str] = &[
        "on process",
        "for processing",
        "processing",
        "on-process",
        "ongoing",
        "in process",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_is_empty() {
        let config = memory_manager();

        assert_eq!(config.get_default_collection().await.unwrap(), "mappings");
        assert_eq!(config.get_partition_prefix().await.unwrap(), "import_");
        assert!(config.get_allow_partition_collections().await.unwrap());
        assert!(config
            .get_ongoing_status_keywords()
            .await
            .unwrap()
            .contains(&"for processing".to_string()));
    }

    #[tokio::test]
    async fn test_overrides_are_read_back() {
        let config = memory_manager();
        config
            .set_global_config_value(config_keys::DEFAULT_COLLECTION, "registry")
            .unwrap();
        config
            .set_global_config_value(config_keys::ALLOW_PARTITION_COLLECTIONS, "off")
            .unwrap();
        config
            .set_global_config_value(config_keys::ONGOING_STATUS_KEYWORDS, "Pending, FBI ,")
            .unwrap();

        assert_eq!(config.get_default_collection().await.unwrap(), "registry");
        assert!(!config.get_allow_partition_collections().await.unwrap());
        assert_eq!(
            config.get_ongoing_status_keywords().await.unwrap(),
            vec!["pending".to_string(), "fbi".to_string()]
        );

        let snapshot = config.get_config_snapshot().unwrap();
        assert!(snapshot.contains("registry"));
    }
}

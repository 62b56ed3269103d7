// ==========================================
// NCIP Registry Import - SQLite record store
// ==========================================
// Role: RecordStore + PartitionIndex over rusqlite
// Documents are stored as JSON carrying the legacy alias table;
// reads fold aliases back into canonical fields
// Access: the default collection is always writable; other collections
//         need a grant, created on first write only when allowed
// ==========================================

use crate::config::config_defaults;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::aliases::{apply_aliases, resolve_aliases};
use crate::domain::{CanonicalRecord, PartitionMeta, StoredRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{PartitionIndex, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
    default_collection: String,
    allow_partition_collections: bool,
}

impl SqliteRecordStore {
    /// Open the database file and make sure the schema exists.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// Build on an existing connection; the schema must already exist.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            default_collection: config_defaults::DEFAULT_COLLECTION.to_string(),
            allow_partition_collections: config_defaults::ALLOW_PARTITION_COLLECTIONS,
        }
    }

    pub fn with_access_policy(
        mut self,
        default_collection: impl Into<String>,
        allow_partition_collections: bool,
    ) -> Self {
        self.default_collection = default_collection.into();
        self.allow_partition_collections = allow_partition_collections;
        self
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Add a collection to the grant list.
    pub fn grant_collection(&self, collection: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO collection_grant (collection) VALUES (?1)",
            params![collection],
        )?;
        Ok(())
    }

    fn ensure_writable(&self, conn: &Connection, collection: &str) -> RepositoryResult<()> {
        if collection == self.default_collection {
            return Ok(());
        }

        let granted = conn
            .query_row(
                "SELECT 1 FROM collection_grant WHERE collection = ?1",
                params![collection],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if granted {
            return Ok(());
        }

        if self.allow_partition_collections {
            conn.execute(
                "INSERT OR IGNORE INTO collection_grant (collection) VALUES (?1)",
                params![collection],
            )?;
            debug!(collection, "collection created on first write");
            return Ok(());
        }

        Err(RepositoryError::PermissionDenied {
            collection: collection.to_string(),
            message: "insufficient permissions to create collection".to_string(),
        })
    }

    fn load_doc(
        conn: &Connection,
        collection: &str,
        id: &str,
    ) -> RepositoryResult<Map<String, Value>> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc_json FROM record_document WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let raw = raw.ok_or_else(|| RepositoryError::NotFound {
            entity: format!("record_document[{}]", collection),
            id: id.to_string(),
        })?;
        let mut doc = parse_object(&raw)?;
        resolve_aliases(&mut doc);
        Ok(doc)
    }

    fn save_doc(
        conn: &Connection,
        collection: &str,
        id: &str,
        mut doc: Map<String, Value>,
    ) -> RepositoryResult<()> {
        let owner_id = doc
            .get("ownerId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        apply_aliases(&mut doc);

        conn.execute(
            r#"
            UPDATE record_document
            SET doc_json = ?3, owner_id = ?4, updated_at = ?5
            WHERE collection = ?1 AND id = ?2
            "#,
            params![
                collection,
                id,
                Value::Object(doc).to_string(),
                owner_id,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn query_documents(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<StoredRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            records.push(to_stored_record(id, &raw)?);
        }
        Ok(records)
    }
}

fn record_to_object(record: &CanonicalRecord) -> RepositoryResult<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(RepositoryError::SerializationError(format!(
            "record serialized to non-object: {}",
            other
        ))),
    }
}

fn parse_object(raw: &str) -> RepositoryResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(RepositoryError::SerializationError(
            "stored document is not a JSON object".to_string(),
        )),
    }
}

fn to_stored_record(id: String, raw: &str) -> RepositoryResult<StoredRecord> {
    let mut doc = parse_object(raw)?;
    resolve_aliases(&mut doc);
    let record: CanonicalRecord = serde_json::from_value(Value::Object(doc))?;
    Ok(StoredRecord { id, record })
}

// ==========================================
// RecordStore implementation
// ==========================================
#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, collection: &str, record: &CanonicalRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        self.ensure_writable(&conn, collection)?;

        let id = Uuid::new_v4().to_string();
        let mut doc = record_to_object(record)?;
        apply_aliases(&mut doc);
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO record_document (collection, id, owner_id, doc_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                collection,
                id,
                record.owner_id,
                Value::Object(doc).to_string(),
                now
            ],
        )?;
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        record: &CanonicalRecord,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        self.ensure_writable(&conn, collection)?;

        let mut doc = Self::load_doc(&conn, collection, id)?;
        for (key, value) in record_to_object(record)? {
            doc.insert(key, value);
        }
        Self::save_doc(&conn, collection, id, doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        self.ensure_writable(&conn, collection)?;

        let affected = conn.execute(
            "DELETE FROM record_document WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: format!("record_document[{}]", collection),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn remove_fields(
        &self,
        collection: &str,
        id: &str,
        fields: &[&str],
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        self.ensure_writable(&conn, collection)?;

        let mut doc = Self::load_doc(&conn, collection, id)?;
        for field in fields {
            doc.remove(*field);
        }
        Self::save_doc(&conn, collection, id, doc)
    }

    async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> RepositoryResult<Vec<StoredRecord>> {
        self.query_documents(
            r#"
            SELECT id, doc_json FROM record_document
            WHERE collection = ?1 AND owner_id = ?2
            ORDER BY created_at, rowid
            "#,
            &[&collection, &owner_id],
        )
    }

    async fn list_all(&self, collection: &str) -> RepositoryResult<Vec<StoredRecord>> {
        self.query_documents(
            r#"
            SELECT id, doc_json FROM record_document
            WHERE collection = ?1
            ORDER BY created_at, rowid
            "#,
            &[&collection],
        )
    }
}

// ==========================================
// PartitionIndex implementation
// ==========================================
#[async_trait]
impl PartitionIndex for SqliteRecordStore {
    async fn register(
        &self,
        owner_id: &str,
        partition_name: &str,
        meta: &PartitionMeta,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO partition_index (
                owner_id, partition_name, display_name, record_count, ongoing, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(owner_id, partition_name) DO UPDATE SET
                display_name = excluded.display_name,
                record_count = excluded.record_count,
                ongoing = excluded.ongoing,
                registered_at = excluded.registered_at
            "#,
            params![
                owner_id,
                partition_name,
                meta.display_name,
                meta.record_count as i64,
                meta.ongoing,
                meta.registered_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> RepositoryResult<Vec<PartitionMeta>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT partition_name, display_name, record_count, ongoing, registered_at
            FROM partition_index
            WHERE owner_id = ?1
            ORDER BY registered_at DESC, partition_name
            "#,
        )?;

        let rows = stmt.query_map(params![owner_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut partitions = Vec::new();
        for row in rows {
            let (partition_name, display_name, record_count, ongoing, registered_at) = row?;
            let registered_at = DateTime::parse_from_rfc3339(&registered_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
            partitions.push(PartitionMeta {
                partition_name,
                display_name,
                record_count: record_count.max(0) as usize,
                ongoing,
                registered_at,
            });
        }
        Ok(partitions)
    }
}

// ==========================================
// In-memory record store for reconciler tests
// ==========================================
// Injectable faults: denied collections, failing deletes, failure after N writes
// Every call is appended to `ops` so tests can assert on ordering
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use ncip_import::domain::{CanonicalRecord, PartitionMeta, StoredRecord};
use ncip_import::engine::merge_record;
use ncip_import::repository::{
    PartitionIndex, RecordStore, RepositoryError, RepositoryResult,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Create { collection: String, id: String },
    Update { collection: String, id: String },
    Delete { collection: String, id: String },
    RemoveFields { collection: String, id: String },
}

#[derive(Default)]
struct Inner {
    // collection -> (id -> record)
    collections: BTreeMap<String, BTreeMap<String, CanonicalRecord>>,
    partitions: Vec<(String, PartitionMeta)>,
    ops: Vec<Op>,
    next_id: usize,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    denied_collections: HashSet<String>,
    deny_all_except: Option<String>,
    fail_deletes: bool,
    fail_after_writes: Option<usize>,
    fail_partition_register: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny every write outside `collection`.
    pub fn only_writable(mut self, collection: &str) -> Self {
        self.deny_all_except = Some(collection.to_string());
        self
    }

    pub fn deny(mut self, collection: &str) -> Self {
        self.denied_collections.insert(collection.to_string());
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Let `n` creates/updates succeed, fail the next one.
    pub fn failing_after_writes(mut self, n: usize) -> Self {
        self.fail_after_writes = Some(n);
        self
    }

    pub fn failing_partition_register(mut self) -> Self {
        self.fail_partition_register = true;
        self
    }

    /// Seed a record without recording an op.
    pub fn seed(&self, collection: &str, record: CanonicalRecord) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("seed-{}", inner.next_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record);
        id
    }

    pub fn records(&self, collection: &str) -> Vec<StoredRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, record)| StoredRecord {
                        id: id.clone(),
                        record: record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.inner.lock().unwrap().ops.clone()
    }

    pub fn registered_partitions(&self) -> Vec<(String, PartitionMeta)> {
        self.inner.lock().unwrap().partitions.clone()
    }

    fn check_writable(&self, collection: &str) -> RepositoryResult<()> {
        let denied = self.denied_collections.contains(collection)
            || self
                .deny_all_except
                .as_deref()
                .map(|allowed| allowed != collection)
                .unwrap_or(false);
        if denied {
            return Err(RepositoryError::PermissionDenied {
                collection: collection.to_string(),
                message: "Missing or insufficient permissions.".to_string(),
            });
        }
        Ok(())
    }

    fn count_write(&self, inner: &mut Inner) -> RepositoryResult<()> {
        if let Some(limit) = self.fail_after_writes {
            if inner.writes >= limit {
                return Err(RepositoryError::DatabaseQueryError(
                    "quota exceeded".to_string(),
                ));
            }
        }
        inner.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, collection: &str, record: &CanonicalRecord) -> RepositoryResult<String> {
        self.check_writable(collection)?;
        let mut inner = self.inner.lock().unwrap();
        self.count_write(&mut inner)?;

        inner.next_id += 1;
        let id = format!("doc-{}", inner.next_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record.clone());
        inner.ops.push(Op::Create {
            collection: collection.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        record: &CanonicalRecord,
    ) -> RepositoryResult<()> {
        self.check_writable(collection)?;
        let mut inner = self.inner.lock().unwrap();
        self.count_write(&mut inner)?;

        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "record".to_string(),
                id: id.to_string(),
            })?;
        *doc = merge_record(doc, record);
        inner.ops.push(Op::Update {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()> {
        if self.fail_deletes {
            return Err(RepositoryError::DatabaseQueryError(
                "delete rejected".to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "record".to_string(),
                id: id.to_string(),
            });
        }
        inner.ops.push(Op::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        Ok(())
    }

    async fn remove_fields(
        &self,
        collection: &str,
        id: &str,
        fields: &[&str],
    ) -> RepositoryResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "record".to_string(),
                id: id.to_string(),
            })?;
        for field in fields {
            match *field {
                "ongoingFlag" => doc.ongoing_flag = None,
                "importPartition" => doc.import_partition = None,
                "importBatchId" => doc.import_batch_id = None,
                "importedAt" => doc.imported_at = None,
                _ => {}
            }
        }
        inner.ops.push(Op::RemoveFields {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        Ok(())
    }

    async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> RepositoryResult<Vec<StoredRecord>> {
        Ok(self
            .records(collection)
            .into_iter()
            .filter(|r| r.record.owner_id == owner_id)
            .collect())
    }

    async fn list_all(&self, collection: &str) -> RepositoryResult<Vec<StoredRecord>> {
        Ok(self.records(collection))
    }
}

#[async_trait]
impl PartitionIndex for MemoryStore {
    async fn register(
        &self,
        owner_id: &str,
        _partition_name: &str,
        meta: &PartitionMeta,
    ) -> RepositoryResult<()> {
        if self.fail_partition_register {
            return Err(RepositoryError::DatabaseQueryError(
                "index unavailable".to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.partitions.push((owner_id.to_string(), meta.clone()));
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> RepositoryResult<Vec<PartitionMeta>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .partitions
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, meta)| meta.clone())
            .collect())
    }
}

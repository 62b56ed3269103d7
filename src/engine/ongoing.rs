// ==========================================
// NCIP Registry Import - Ongoing working set
// ==========================================
// Role: decide which records belong to the in-progress set, and clear the tags
// Sources: ongoingFlag, importPartition, status-like free text
// ==========================================

use crate::domain::{CanonicalRecord, StoredRecord};
use crate::repository::{RecordStore, RepositoryResult};
use tracing::{debug, info};

/// Stored field names removed by `clear_ongoing_flags`.
pub const ONGOING_TAG_FIELDS: &[&str] = &["ongoingFlag", "importPartition"];

// ==========================================
// OngoingDetector
// ==========================================
#[derive(Debug, Clone)]
pub struct OngoingDetector {
    keywords: Vec<String>,
}

impl OngoingDetector {
    /// `keywords` are matched case-insensitively as substrings.
    pub fn new(keywords: Vec<String>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Record carries an explicit ongoing tag (flag or partition name).
    pub fn is_tagged(&self, record: &CanonicalRecord) -> bool {
        record.is_ongoing()
            || record
                .import_partition
                .as_deref()
                .map(|p| p.to_lowercase().contains("ongoing"))
                .unwrap_or(false)
    }

    /// Tagged, or a status-like field mentions an ongoing keyword.
    pub fn is_ongoing(&self, record: &CanonicalRecord) -> bool {
        if self.is_tagged(record) {
            return true;
        }

        [&record.cadt_status, &record.remarks].into_iter().any(|text| {
            let text = text.to_lowercase();
            self.keywords.iter().any(|k| text.contains(k.as_str()))
        })
    }

    pub fn filter<'a>(&self, records: &'a [StoredRecord]) -> Vec<&'a StoredRecord> {
        records.iter().filter(|r| self.is_ongoing(&r.record)).collect()
    }
}

/// Remove the ongoing tags from every tagged record the owner has in `collection`.
///
/// Records that only match by status keyword carry no tag and are left alone.
/// Returns the number of records cleared.
pub async fn clear_ongoing_flags<S>(
    store: &S,
    detector: &OngoingDetector,
    collection: &str,
    owner_id: &str,
) -> RepositoryResult<usize>
where
    S: RecordStore + ?Sized,
{
    let records = store.query_by_owner(collection, owner_id).await?;

    let mut cleared = 0;
    for stored in records.iter().filter(|r| detector.is_tagged(&r.record)) {
        store
            .remove_fields(collection, &stored.id, ONGOING_TAG_FIELDS)
            .await?;
        debug!(id = %stored.id, "ongoing tags removed");
        cleared += 1;
    }

    info!(owner_id, collection, cleared, "ongoing flags cleared");
    Ok(cleared)
}

// ==========================================
// NCIP Registry Import - Reconciliation planning
// ==========================================
// Role: pure fold (existing, incoming, mode) -> ordered steps + next snapshot
// Red line: no store access here, the executor performs every step in order
// ==========================================
// Ordering: Replace deletions first, then one step per incoming record
// Ties on the natural key resolve by processing order (last write wins)
// ==========================================

use crate::domain::{CanonicalRecord, ImportMode, ReconcileSummary, StoredRecord};
use std::collections::HashMap;

pub const SKIP_NO_KEY: &str = "no survey number or control number";

// ==========================================
// WriteTarget - where an update lands
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Persisted before this run.
    Existing(String),
    /// Created earlier in this run by the step at this index.
    Planned(usize),
}

// ==========================================
// PlanStep - one unit of progress
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    Delete { id: String },
    Create { record: CanonicalRecord },
    Update { target: WriteTarget, record: CanonicalRecord },
    Skip { reason: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRecord {
    pub slot: WriteTarget,
    pub record: CanonicalRecord,
}

// ==========================================
// ReconcilePlan
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub steps: Vec<PlanStep>,
    /// Persisted set expected after every step succeeds.
    pub next_set: Vec<PlannedRecord>,
    /// Counts expected after every step succeeds.
    pub expected: ReconcileSummary,
}

impl ReconcilePlan {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }
}

/// Fold the incoming batch over the existing set.
///
/// - Append: existing records are matched by natural key and updated in place.
/// - Replace: every existing record is deleted, then the batch is folded
///   against an empty set.
/// - NewPartition: the batch is folded against an empty set and `existing`
///   is left untouched.
///
/// Records without a natural key are skipped in every mode.
pub fn plan_reconciliation(
    existing: &[StoredRecord],
    incoming: Vec<CanonicalRecord>,
    mode: ImportMode,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    match mode {
        ImportMode::Append => {
            for stored in existing {
                if let Some(key) = stored.record.natural_key() {
                    by_key.entry(key).or_insert(plan.next_set.len());
                }
                plan.next_set.push(PlannedRecord {
                    slot: WriteTarget::Existing(stored.id.clone()),
                    record: stored.record.clone(),
                });
            }
        }
        ImportMode::Replace => {
            for stored in existing {
                plan.steps.push(PlanStep::Delete {
                    id: stored.id.clone(),
                });
                plan.expected.deleted += 1;
            }
        }
        ImportMode::NewPartition => {}
    }

    for record in incoming {
        let Some(key) = record.natural_key() else {
            plan.steps.push(PlanStep::Skip {
                reason: SKIP_NO_KEY,
            });
            plan.expected.skipped += 1;
            continue;
        };

        match by_key.get(&key) {
            Some(&slot_idx) => {
                let slot = &mut plan.next_set[slot_idx];
                slot.record = merge_record(&slot.record, &record);
                plan.steps.push(PlanStep::Update {
                    target: slot.slot.clone(),
                    record,
                });
                plan.expected.updated += 1;
            }
            None => {
                let step_idx = plan.steps.len();
                by_key.insert(key, plan.next_set.len());
                plan.next_set.push(PlannedRecord {
                    slot: WriteTarget::Planned(step_idx),
                    record: record.clone(),
                });
                plan.steps.push(PlanStep::Create { record });
                plan.expected.created += 1;
            }
        }
    }

    plan
}

/// Merge semantics of an in-place update: incoming values overwrite,
/// optional tags the incoming record leaves unset are kept.
pub fn merge_record(base: &CanonicalRecord, incoming: &CanonicalRecord) -> CanonicalRecord {
    let mut merged = incoming.clone();
    if merged.import_batch_id.is_none() {
        merged.import_batch_id = base.import_batch_id.clone();
    }
    if merged.imported_at.is_none() {
        merged.imported_at = base.imported_at;
    }
    if merged.ongoing_flag.is_none() {
        merged.ongoing_flag = base.ongoing_flag;
    }
    if merged.import_partition.is_none() {
        merged.import_partition = base.import_partition.clone();
    }
    merged
}

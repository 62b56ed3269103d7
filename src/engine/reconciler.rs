// ==========================================
// NCIP Registry Import - Import reconciler
// ==========================================
// Role: execute a ReconcilePlan against the persisted store
// Modes: Append / Replace / NewPartition (with default-set fallback)
// ==========================================
// Red line: store calls are awaited one at a time, in plan order
// Red line: committed records are never rolled back
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::{
    CanonicalRecord, ImportMode, PartitionMeta, ReconcileSummary, StoredRecord,
};
use crate::engine::error::{ReconcileError, ReconcileResult};
use crate::engine::partition::{disambiguate_partition_name, resolve_partition_name};
use crate::engine::reconcile_plan::{plan_reconciliation, PlanStep, ReconcilePlan, WriteTarget};
use crate::repository::{PartitionIndex, RecordStore, RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// ReconcileOptions
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub owner_id: String,
    /// Label for NewPartition runs; sanitized, generated when absent.
    pub partition_name: Option<String>,
    /// Tag every written record with `ongoingFlag = true`.
    pub mark_ongoing: bool,
    /// Checked between units; set it to stop the run after the current unit.
    pub cancel: Arc<AtomicBool>,
}

impl ReconcileOptions {
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

// ==========================================
// ReconcileOutcome
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub summary: ReconcileSummary,
    /// Collection the active view was read from.
    pub collection: String,
    /// Records the caller should display after the run.
    pub active_view: Vec<StoredRecord>,
}

/// Integer percentage of `done` over `total`; 100 for an empty run.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

// ==========================================
// RunState - mutable bookkeeping of one run
// ==========================================
struct RunState {
    summary: ReconcileSummary,
    default_collection: String,
    partition: Option<String>,
    fallback: bool,
    // step index of a Create -> (collection, id)
    created: HashMap<usize, (String, String)>,
}

impl RunState {
    /// Collection new records go to right now.
    fn create_collection(&self) -> &str {
        match (&self.partition, self.fallback) {
            (Some(partition), false) => partition,
            _ => &self.default_collection,
        }
    }

    /// Copy of `record` tagged with the intended partition when redirected.
    fn redirected(&self, record: &CanonicalRecord, collection: &str) -> CanonicalRecord {
        let mut record = record.clone();
        if self.fallback && collection == self.default_collection {
            record.import_partition = self.partition.clone();
        }
        record
    }
}

// ==========================================
// ImportReconciler
// ==========================================
pub struct ImportReconciler<S: ?Sized, P: ?Sized, C: ?Sized>
where
    S: RecordStore,
    P: PartitionIndex,
    C: ImportConfigReader,
{
    store: Arc<S>,
    partitions: Arc<P>,
    config: Arc<C>,
}

impl<S: ?Sized, P: ?Sized, C: ?Sized> ImportReconciler<S, P, C>
where
    S: RecordStore,
    P: PartitionIndex,
    C: ImportConfigReader,
{
    pub fn new(store: Arc<S>, partitions: Arc<P>, config: Arc<C>) -> Self {
        Self {
            store,
            partitions,
            config,
        }
    }

    /// Reconcile a validated batch against the owner's persisted set.
    ///
    /// `existing` is the owner's current default-collection set.
    /// `progress` receives an integer percentage after every unit
    /// (deletion, write or skip); it never decreases and ends at 100 on success.
    ///
    /// # Errors
    /// - `DeleteFailed`: Replace stopped before any write
    /// - `Aborted`: a write failed, earlier writes stay committed
    /// - `PartitionIndex`: writes succeeded, registration did not
    /// - `Cancelled`: the cancel flag was raised between units
    #[instrument(
        skip(self, records, options, existing, progress),
        fields(mode = %mode, owner_id = %options.owner_id, incoming = records.len())
    )]
    pub async fn reconcile(
        &self,
        records: Vec<CanonicalRecord>,
        mode: ImportMode,
        options: &ReconcileOptions,
        existing: &[StoredRecord],
        progress: &mut (dyn FnMut(u8) + Send),
    ) -> ReconcileResult<ReconcileOutcome> {
        let default_collection = self
            .config
            .get_default_collection()
            .await
            .map_err(|e| ReconcileError::Config(e.to_string()))?;

        let partition = match mode {
            ImportMode::NewPartition => {
                let prefix = self
                    .config
                    .get_partition_prefix()
                    .await
                    .map_err(|e| ReconcileError::Config(e.to_string()))?;
                let now = Utc::now();
                let base = resolve_partition_name(options.partition_name.as_deref(), &prefix, now);
                Some(self.unused_partition_name(base, &options.owner_id, now).await?)
            }
            _ => None,
        };

        let prepared = records
            .into_iter()
            .map(|record| prepare_record(record, options))
            .collect();
        let plan = plan_reconciliation(existing, prepared, mode);

        info!(
            steps = plan.total_steps(),
            expected_created = plan.expected.created,
            expected_updated = plan.expected.updated,
            expected_deleted = plan.expected.deleted,
            partition = ?partition,
            "reconciliation started"
        );

        let mut run = RunState {
            summary: ReconcileSummary {
                partition_name: partition.clone(),
                ..Default::default()
            },
            default_collection,
            partition,
            fallback: false,
            created: HashMap::new(),
        };

        self.execute(&plan, options, &mut run, progress).await?;

        let collection = run.create_collection().to_string();
        if let (Some(partition), false) = (&run.partition, run.fallback) {
            self.register_partition(partition, options, &run.summary)
                .await?;
        }

        let active_view = match &run.partition {
            Some(_) => self.reload(&collection, &options.owner_id, &plan, &run).await,
            None => resolve_next_set(&plan, &run),
        };

        info!(
            created = run.summary.created,
            updated = run.summary.updated,
            skipped = run.summary.skipped,
            deleted = run.summary.deleted,
            fallback = run.summary.fallback_occurred,
            "reconciliation finished"
        );

        Ok(ReconcileOutcome {
            summary: run.summary,
            collection,
            active_view,
        })
    }

    async fn execute(
        &self,
        plan: &ReconcilePlan,
        options: &ReconcileOptions,
        run: &mut RunState,
        progress: &mut (dyn FnMut(u8) + Send),
    ) -> ReconcileResult<()> {
        let total = plan.total_steps();
        if total == 0 {
            progress(100);
            return Ok(());
        }

        for (idx, step) in plan.steps.iter().enumerate() {
            if options.is_cancelled() {
                warn!(step = idx, total, "reconciliation cancelled");
                return Err(ReconcileError::Cancelled {
                    summary: run.summary.clone(),
                });
            }

            match step {
                PlanStep::Delete { id } => {
                    if let Err(source) = self.store.delete(&run.default_collection, id).await {
                        error!(id = %id, deleted = run.summary.deleted, error = %source, "replace aborted during deletion");
                        return Err(ReconcileError::DeleteFailed {
                            id: id.clone(),
                            deleted: run.summary.deleted,
                            source,
                        });
                    }
                    run.summary.deleted += 1;
                }
                PlanStep::Skip { reason } => {
                    debug!(step = idx, reason, "record skipped");
                    run.summary.skipped += 1;
                }
                PlanStep::Create { record } => {
                    let created = self.create_record(record, run).await;
                    let (collection, id) = created.map_err(|source| abort(run, source))?;
                    run.created.insert(idx, (collection, id));
                    run.summary.created += 1;
                }
                PlanStep::Update { target, record } => {
                    let (collection, id) = match target {
                        WriteTarget::Existing(id) => (run.default_collection.clone(), id.clone()),
                        WriteTarget::Planned(step) => match run.created.get(step) {
                            Some(location) => location.clone(),
                            None => {
                                let source = RepositoryError::InternalError(format!(
                                    "update target step {} was never created",
                                    step
                                ));
                                return Err(abort(run, source));
                            }
                        },
                    };
                    let record = run.redirected(record, &collection);
                    if let Err(source) = self.store.update(&collection, &id, &record).await {
                        return Err(abort(run, source));
                    }
                    run.summary.updated += 1;
                }
            }

            progress(progress_percent(idx + 1, total));
        }

        Ok(())
    }

    /// Create into the current target; the first permission denial on a
    /// partition switches the rest of the run to the default collection.
    async fn create_record(
        &self,
        record: &CanonicalRecord,
        run: &mut RunState,
    ) -> RepositoryResult<(String, String)> {
        if let (Some(partition), false) = (&run.partition, run.fallback) {
            match self.store.create(partition, record).await {
                Ok(id) => return Ok((partition.clone(), id)),
                Err(e) if e.is_permission_denied() => {
                    warn!(
                        partition = %partition,
                        default_collection = %run.default_collection,
                        error = %e,
                        "partition write denied, redirecting to default collection"
                    );
                    run.fallback = true;
                    run.summary.fallback_occurred = true;
                }
                Err(e) => return Err(e),
            }
        }

        let collection = run.create_collection().to_string();
        let record = run.redirected(record, &collection);
        let id = self.store.create(&collection, &record).await?;
        Ok((collection, id))
    }

    /// `base`, or its first disambiguated form that is neither registered
    /// for the owner nor an existing non-empty collection.
    async fn unused_partition_name(
        &self,
        base: String,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> ReconcileResult<String> {
        let lookup_failed = |source: RepositoryError| ReconcileError::PartitionLookup {
            partition_name: base.clone(),
            source,
        };

        let registered: HashSet<String> = self
            .partitions
            .list(owner_id)
            .await
            .map_err(&lookup_failed)?
            .into_iter()
            .map(|meta| meta.partition_name)
            .collect();

        let mut candidate = base.clone();
        let mut attempt = 0;
        loop {
            let in_use = registered.contains(&candidate)
                || !self
                    .store
                    .list_all(&candidate)
                    .await
                    .map_err(&lookup_failed)?
                    .is_empty();
            if !in_use {
                break;
            }
            attempt += 1;
            candidate = disambiguate_partition_name(&base, now, attempt);
        }

        if candidate != base {
            info!(requested = %base, partition = %candidate, "partition name in use, renamed");
        }
        Ok(candidate)
    }

    async fn register_partition(
        &self,
        partition_name: &str,
        options: &ReconcileOptions,
        summary: &ReconcileSummary,
    ) -> ReconcileResult<()> {
        let display_name = options
            .partition_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(partition_name)
            .to_string();

        let meta = PartitionMeta {
            partition_name: partition_name.to_string(),
            display_name,
            record_count: summary.created,
            ongoing: options.mark_ongoing,
            registered_at: Utc::now(),
        };

        self.partitions
            .register(&options.owner_id, partition_name, &meta)
            .await
            .map_err(|source| {
                error!(partition = %partition_name, error = %source, "partition registration failed");
                ReconcileError::PartitionIndex {
                    partition_name: partition_name.to_string(),
                    summary: summary.clone(),
                    source,
                }
            })
    }

    async fn reload(
        &self,
        collection: &str,
        owner_id: &str,
        plan: &ReconcilePlan,
        run: &RunState,
    ) -> Vec<StoredRecord> {
        match self.store.query_by_owner(collection, owner_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(collection, error = %e, "reload failed, showing planned set");
                resolve_next_set(plan, run)
            }
        }
    }
}

fn prepare_record(mut record: CanonicalRecord, options: &ReconcileOptions) -> CanonicalRecord {
    record.owner_id = options.owner_id.clone();
    if options.mark_ongoing {
        record.ongoing_flag = Some(true);
    }
    record
}

fn abort(run: &RunState, source: RepositoryError) -> ReconcileError {
    error!(
        committed = run.summary.committed(),
        error = %source,
        "reconciliation aborted"
    );
    ReconcileError::Aborted {
        summary: run.summary.clone(),
        source,
    }
}

fn resolve_next_set(plan: &ReconcilePlan, run: &RunState) -> Vec<StoredRecord> {
    plan.next_set
        .iter()
        .filter_map(|planned| {
            let id = match &planned.slot {
                WriteTarget::Existing(id) => id.clone(),
                WriteTarget::Planned(step) => run.created.get(step)?.1.clone(),
            };
            Some(StoredRecord {
                id,
                record: planned.record.clone(),
            })
        })
        .collect()
}

// ==========================================
// NCIP Registry Import - Engine layer
// ==========================================
// Role: Import Reconciler (plan, execute, partition naming, ongoing set)
// Red line: persistence only through repository traits
// ==========================================

pub mod error;
pub mod ongoing;
pub mod partition;
pub mod reconcile_plan;
pub mod reconciler;

pub use error::{ReconcileError, ReconcileResult};
pub use ongoing::{clear_ongoing_flags, OngoingDetector, ONGOING_TAG_FIELDS};
pub use partition::{
    disambiguate_partition_name, generate_partition_name, resolve_partition_name,
    sanitize_partition_name,
};
pub use reconcile_plan::{
    merge_record, plan_reconciliation, PlanStep, PlannedRecord, ReconcilePlan, WriteTarget,
};
pub use reconciler::{progress_percent, ImportReconciler, ReconcileOptions, ReconcileOutcome};

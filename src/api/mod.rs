// ==========================================
// NCIP Registry Import - API layer
// ==========================================
// Role: facade used by the CLI and embedding applications
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{
    failure_message, success_message, FileImportResponse, ImportApi, ImportRunResponse,
    SheetOverview,
};

//! Import run history model.

use mundocuotas_core::import_run::{ImportKind, ImportRunStatus, RunCounts};
use mundocuotas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `import_runs` table, including the per-row results.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRun {
    pub id: DbId,
    pub kind: String,
    pub file_name: String,
    pub status: String,
    pub total_rows: i32,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: i32,
    pub results: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An `import_runs` row without its results, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRunListItem {
    pub id: DbId,
    pub kind: String,
    pub file_name: String,
    pub status: String,
    pub total_rows: i32,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: i32,
    pub created_at: Timestamp,
}

/// DTO for recording a finished run.
#[derive(Debug, Clone)]
pub struct CreateImportRun {
    pub kind: ImportKind,
    pub file_name: String,
    pub status: ImportRunStatus,
    pub counts: RunCounts,
    pub results: serde_json::Value,
}

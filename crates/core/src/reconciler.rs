//! The bulk product migration: normalize, match, apply, cascade.
//!
//! Rows are processed strictly one at a time and every store call is
//! awaited before the next row starts, so a line, category or brand created
//! for one row is visible to the rows after it. A failure in one row is
//! recorded as that row's result and the run moves on; a row reported as
//! an error has written nothing.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cascade::{recompute_best_effort, PlanFlags, ProductPlanState};
use crate::catalog::{
    spreadsheet_row_number, CatalogEntry, CatalogRow, MigrationProgress, MigrationResult,
    MigrationStatus, MigrationSummary, ProductDraft, MISSING_DESCRIPTION_LABEL,
};
use crate::error::CoreError;
use crate::matcher::{decide, skip_message, update_message, Decision};
use crate::normalizer::{normalize_rows, RawRow};
use crate::store::CatalogStore;

/// Message for rows never reached because the run was cancelled.
pub const CANCELLED_ROW_MESSAGE: &str = "Migración cancelada antes de procesar esta fila";

// ---------------------------------------------------------------------------
// Run control
// ---------------------------------------------------------------------------

/// Progress reporting and cancellation shared by the import runs.
///
/// Progress is published after every row; cancellation is only observed
/// between rows.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    progress: Option<watch::Sender<MigrationProgress>>,
    cancel: CancellationToken,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish progress on `tx` after every row.
    pub fn with_progress(mut self, tx: watch::Sender<MigrationProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Stop before the next row once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn publish(&self, completed: usize, total: usize) {
        if let Some(tx) = &self.progress {
            tx.send_replace(MigrationProgress { completed, total });
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything a finished product migration reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// One entry per input row, in input order.
    pub results: Vec<MigrationResult>,
    pub summary: MigrationSummary,
    /// Whether the run stopped early; unprocessed rows are reported as
    /// skipped.
    pub cancelled: bool,
}

impl MigrationReport {
    fn new(results: Vec<MigrationResult>, cancelled: bool) -> Self {
        let summary = MigrationSummary::from_results(&results);
        Self {
            results,
            summary,
            cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

/// A product migration bound to a store.
pub struct ProductMigration<'s> {
    store: &'s dyn CatalogStore,
    control: RunControl,
}

impl<'s> ProductMigration<'s> {
    pub fn new(store: &'s dyn CatalogStore) -> Self {
        Self {
            store,
            control: RunControl::default(),
        }
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Reconcile every row of a parsed sheet against the catalog.
    ///
    /// The only error returned is a failure to load the catalog snapshot,
    /// which happens before any row is touched. Everything after that is
    /// reported per row.
    pub async fn run(&self, rows: &[RawRow]) -> Result<MigrationReport, CoreError> {
        let total = rows.len();
        let snapshot = self.store.find_products().await?;

        tracing::info!(
            rows = total,
            snapshot = snapshot.len(),
            "Product migration started"
        );
        self.control.publish(0, total);

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, row) in normalize_rows(rows).enumerate() {
            let row_number = spreadsheet_row_number(index);

            if cancelled || self.control.is_cancelled() {
                cancelled = true;
                results.push(MigrationResult {
                    row_number,
                    description: display_description(&row),
                    code: row.code.clone(),
                    status: MigrationStatus::Skipped,
                    message: CANCELLED_ROW_MESSAGE.to_string(),
                });
                continue;
            }

            let result = apply_row(self.store, &snapshot, row_number, &row).await;
            tracing::debug!(
                row = row_number,
                status = %result.status,
                message = %result.message,
                "Row processed"
            );
            results.push(result);
            self.control.publish(index + 1, total);
        }

        let report = MigrationReport::new(results, cancelled);
        tracing::info!(
            total = report.summary.total,
            created = report.summary.created,
            updated = report.summary.updated,
            skipped = report.summary.skipped,
            errors = report.summary.errors,
            cancelled,
            "Product migration finished"
        );
        Ok(report)
    }
}

/// Decide and apply one normalized row, producing its result.
pub async fn apply_row(
    store: &dyn CatalogStore,
    snapshot: &[CatalogEntry],
    row_number: usize,
    row: &CatalogRow,
) -> MigrationResult {
    let outcome = |status: MigrationStatus, message: String| MigrationResult {
        row_number,
        description: display_description(row),
        code: row.code.clone(),
        status,
        message,
    };

    match decide(row, snapshot) {
        Decision::Reject(e) => outcome(MigrationStatus::Error, e.to_string()),

        Decision::Skip { target, reason } => {
            outcome(MigrationStatus::Skipped, skip_message(row, target, reason))
        }

        Decision::Update { target, patch } => {
            match store.update_product(target.id, &patch).await {
                Ok(()) => outcome(
                    MigrationStatus::Updated,
                    update_message(row, target, &patch),
                ),
                Err(e) => {
                    tracing::error!(row = row_number, product_id = target.id, error = %e, "Product update failed");
                    outcome(
                        MigrationStatus::Error,
                        format!("Error actualizando producto: {e}"),
                    )
                }
            }
        }

        Decision::Create => match create_from_row(store, row).await {
            Ok(message) => outcome(MigrationStatus::Created, message),
            Err(message) => outcome(MigrationStatus::Error, message),
        },
    }
}

/// Insert the product with its taxonomy and run the plan cascade.
/// Returns the operator-facing message either way.
async fn create_from_row(store: &dyn CatalogStore, row: &CatalogRow) -> Result<String, String> {
    let draft = ProductDraft::from_row(row);

    let created = store
        .create_product_with_taxonomy(&draft)
        .await
        .map_err(|e| {
            tracing::error!(description = %draft.description, error = %e, "Product create failed");
            e.to_string()
        })?;

    let association_note = if draft.applies_to_all_plans {
        let state = ProductPlanState {
            flags: PlanFlags::all_plans(),
            category_id: created.category_id,
        };
        match recompute_best_effort(store, created.entry.id, &state).await {
            Some(_) => " con asociaciones a todos los planes",
            None => " (ERROR creando asociaciones a planes)",
        }
    } else {
        ""
    };

    let code_note = draft
        .code
        .as_deref()
        .map(|code| format!(" con código \"{code}\""))
        .unwrap_or_default();

    Ok(format!(
        "Producto creado exitosamente (ID: {}){code_note}{association_note}",
        created.entry.id
    ))
}

/// Description shown for a row; blank descriptions get a placeholder.
fn display_description(row: &CatalogRow) -> String {
    if row.description.trim().is_empty() {
        MISSING_DESCRIPTION_LABEL.to_string()
    } else {
        row.description.clone()
    }
}

//! Bulk assignment of supplier codes to existing products.
//!
//! Each sheet row names a product by description and the code it should
//! carry. Products are found by description in the read-once snapshot and
//! only their `codigo` column is ever written.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    spreadsheet_row_number, CatalogEntry, ProductPatch, MISSING_DESCRIPTION_LABEL,
};
use crate::error::CoreError;
use crate::matcher::find_by_description;
use crate::normalizer::RawRow;
use crate::reconciler::{RunControl, CANCELLED_ROW_MESSAGE};
use crate::store::CatalogStore;

/// Headers read by the code assignment sheet.
pub const CODE_SHEET_DESCRIPTION_COLUMNS: &[&str] = &["descripcion"];
pub const CODE_SHEET_CODE_COLUMNS: &[&str] = &["codigo"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One normalized row of a code assignment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAssignmentRow {
    pub description: String,
    pub code: String,
}

impl CodeAssignmentRow {
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            description: row.text(CODE_SHEET_DESCRIPTION_COLUMNS),
            code: row.text(CODE_SHEET_CODE_COLUMNS),
        }
    }

    /// Rows with both fields filled; used to count what a preview will touch.
    pub fn is_complete(&self) -> bool {
        !self.description.is_empty() && !self.code.is_empty()
    }
}

/// Outcome of one code assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeAssignmentStatus {
    Updated,
    NoChange,
    NotFound,
    Error,
    Skipped,
}

impl CodeAssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::NoChange => "no_change",
            Self::NotFound => "not_found",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for CodeAssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAssignmentResult {
    pub row_number: usize,
    pub description: String,
    pub code: String,
    pub status: CodeAssignmentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAssignmentSummary {
    pub total: usize,
    pub updated: usize,
    pub no_change: usize,
    pub not_found: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl CodeAssignmentSummary {
    pub fn from_results(results: &[CodeAssignmentResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.status {
                CodeAssignmentStatus::Updated => summary.updated += 1,
                CodeAssignmentStatus::NoChange => summary.no_change += 1,
                CodeAssignmentStatus::NotFound => summary.not_found += 1,
                CodeAssignmentStatus::Error => summary.errors += 1,
                CodeAssignmentStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAssignmentReport {
    pub results: Vec<CodeAssignmentResult>,
    pub summary: CodeAssignmentSummary,
    pub cancelled: bool,
}

/// What to do with one code assignment row.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeDecision<'a> {
    Reject(&'static str),
    NotFound,
    NoChange(&'a CatalogEntry),
    Assign(&'a CatalogEntry),
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Decide a code assignment row against the snapshot.
///
/// The existing code is compared exactly (case and spacing matter), since
/// the whole point of the sheet is to correct codes.
pub fn decide_code<'a>(row: &CodeAssignmentRow, snapshot: &'a [CatalogEntry]) -> CodeDecision<'a> {
    if row.description.is_empty() {
        return CodeDecision::Reject("La descripción es requerida");
    }
    if row.code.is_empty() {
        return CodeDecision::Reject("El código es requerido");
    }
    match find_by_description(snapshot, &row.description) {
        None => CodeDecision::NotFound,
        Some(entry) if entry.code.as_deref() == Some(row.code.as_str()) => {
            CodeDecision::NoChange(entry)
        }
        Some(entry) => CodeDecision::Assign(entry),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// A code assignment run bound to a store.
pub struct CodeAssignment<'s> {
    store: &'s dyn CatalogStore,
    control: RunControl,
}

impl<'s> CodeAssignment<'s> {
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

    pub async fn run(&self, rows: &[RawRow]) -> Result<CodeAssignmentReport, CoreError> {
        let total = rows.len();
        let snapshot = self.store.find_products().await?;

        tracing::info!(rows = total, "Code assignment started");
        self.control.publish(0, total);

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, raw) in rows.iter().enumerate() {
            let row = CodeAssignmentRow::from_raw(raw);
            let row_number = spreadsheet_row_number(index);

            if cancelled || self.control.is_cancelled() {
                cancelled = true;
                results.push(result(
                    row_number,
                    &row,
                    CodeAssignmentStatus::Skipped,
                    CANCELLED_ROW_MESSAGE.to_string(),
                ));
                continue;
            }

            let outcome = self.apply(&snapshot, row_number, &row).await;
            results.push(outcome);
            self.control.publish(index + 1, total);
        }

        let summary = CodeAssignmentSummary::from_results(&results);
        tracing::info!(
            total = summary.total,
            updated = summary.updated,
            not_found = summary.not_found,
            errors = summary.errors,
            cancelled,
            "Code assignment finished"
        );

        Ok(CodeAssignmentReport {
            results,
            summary,
            cancelled,
        })
    }

    async fn apply(
        &self,
        snapshot: &[CatalogEntry],
        row_number: usize,
        row: &CodeAssignmentRow,
    ) -> CodeAssignmentResult {
        match decide_code(row, snapshot) {
            CodeDecision::Reject(message) => result(
                row_number,
                row,
                CodeAssignmentStatus::Error,
                message.to_string(),
            ),
            CodeDecision::NotFound => result(
                row_number,
                row,
                CodeAssignmentStatus::NotFound,
                "Producto no encontrado".to_string(),
            ),
            CodeDecision::NoChange(_) => result(
                row_number,
                row,
                CodeAssignmentStatus::NoChange,
                format!("Ya tiene el código \"{}\"", row.code),
            ),
            CodeDecision::Assign(entry) => {
                let patch = ProductPatch {
                    code: Some(row.code.clone()),
                    ..ProductPatch::default()
                };
                match self.store.update_product(entry.id, &patch).await {
                    Ok(()) => result(
                        row_number,
                        row,
                        CodeAssignmentStatus::Updated,
                        format!(
                            "Código actualizado de \"{}\" a \"{}\"",
                            entry.code.as_deref().unwrap_or("sin código"),
                            row.code
                        ),
                    ),
                    Err(e) => {
                        tracing::error!(row = row_number, product_id = entry.id, error = %e, "Code update failed");
                        result(row_number, row, CodeAssignmentStatus::Error, e.to_string())
                    }
                }
            }
        }
    }
}

fn result(
    row_number: usize,
    row: &CodeAssignmentRow,
    status: CodeAssignmentStatus,
    message: String,
) -> CodeAssignmentResult {
    let description = if row.description.is_empty() {
        MISSING_DESCRIPTION_LABEL.to_string()
    } else {
        row.description.clone()
    };
    CodeAssignmentResult {
        row_number,
        description,
        code: row.code.clone(),
        status,
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Catalog types shared by the bulk import flows.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - The normalized input row ([`CatalogRow`]) and the snapshot entry it is
//!   reconciled against ([`CatalogEntry`]).
//! - Write payloads for the persistence port ([`ProductDraft`], [`NewProduct`],
//!   [`ProductPatch`]).
//! - Per-row outcomes ([`MigrationResult`]) and run aggregates
//!   ([`MigrationSummary`], [`MigrationProgress`]).

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Price};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Offset between a parsed row index and the spreadsheet row shown to the
/// operator: one for the header, one for 1-based numbering.
pub const SPREADSHEET_ROW_OFFSET: usize = 2;

/// Description reported for rows that arrive without one.
pub const MISSING_DESCRIPTION_LABEL: &str = "Sin descripción";

/// Spreadsheet row number for the row at `index` of the parsed sheet.
pub fn spreadsheet_row_number(index: usize) -> usize {
    index + SPREADSHEET_ROW_OFFSET
}

/// Case-insensitive, whitespace-trimmed text equality used by every
/// catalog lookup.
pub fn text_matches(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Rows and entries
// ---------------------------------------------------------------------------

/// One normalized spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub description: String,
    pub price: Price,
    /// `None` when the sheet had no code column value at all; `Some("")`
    /// is kept distinct so callers can tell a blank cell from a missing one.
    pub code: Option<String>,
    pub category_name: String,
    pub brand_name: String,
    pub line_name: String,
    pub applies_to_all_plans: bool,
}

impl CatalogRow {
    /// The code, if present and non-blank.
    pub fn effective_code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// A product as held in the read-once catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DbId,
    pub description: String,
    pub code: Option<String>,
    pub price: Price,
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// Insert payload for a product created by an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub description: String,
    pub price: Price,
    pub code: Option<String>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub applies_to_all_plans: bool,
}

impl NewProduct {
    /// Resolve a draft against the taxonomy ids the store found or created.
    pub fn from_draft(
        draft: &ProductDraft,
        category_id: Option<DbId>,
        brand_id: Option<DbId>,
    ) -> Self {
        Self {
            description: draft.description.clone(),
            price: draft.price,
            code: draft.code.clone(),
            category_id,
            brand_id,
            applies_to_all_plans: draft.applies_to_all_plans,
        }
    }
}

/// A product to create from a sheet row, with its taxonomy still named
/// rather than resolved. The store creates missing lines, categories and
/// brands together with the product, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub description: String,
    pub price: Price,
    pub code: Option<String>,
    pub category_name: Option<String>,
    /// Only set alongside `category_name`; a line without a category is
    /// never looked up.
    pub line_name: Option<String>,
    pub brand_name: Option<String>,
    pub applies_to_all_plans: bool,
}

impl ProductDraft {
    pub fn from_row(row: &CatalogRow) -> Self {
        let named = |name: &str| Some(name.to_string()).filter(|n| !n.is_empty());
        let category_name = named(&row.category_name);
        Self {
            description: row.description.trim().to_string(),
            price: row.price,
            code: row.effective_code().map(str::to_string),
            line_name: category_name.as_ref().and(named(&row.line_name)),
            category_name,
            brand_name: named(&row.brand_name),
            applies_to_all_plans: row.applies_to_all_plans,
        }
    }
}

/// A product inserted from a [`ProductDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub entry: CatalogEntry,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
}

/// Partial update of a product. Only `Some` fields are written; every other
/// column of the product is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub description: Option<String>,
    pub price: Option<Price>,
    pub code: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.price.is_none() && self.code.is_none()
    }
}

// ---------------------------------------------------------------------------
// Migration status
// ---------------------------------------------------------------------------

/// Outcome of one product migration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Created,
    Updated,
    Skipped,
    Error,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "skipped" => Some(Self::Skipped),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["created", "updated", "skipped", "error"];
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record reported back for one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub row_number: usize,
    pub description: String,
    pub code: Option<String>,
    pub status: MigrationStatus,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Run aggregates
// ---------------------------------------------------------------------------

/// Per-status counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl MigrationSummary {
    pub fn from_results(results: &[MigrationResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                match r.status {
                    MigrationStatus::Created => acc.created += 1,
                    MigrationStatus::Updated => acc.updated += 1,
                    MigrationStatus::Skipped => acc.skipped += 1,
                    MigrationStatus::Error => acc.errors += 1,
                }
                acc
            },
        )
    }

    /// Whether the run wrote anything to the catalog.
    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0
    }
}

/// Rows completed so far out of the rows in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationProgress {
    pub completed: usize,
    pub total: usize,
}

impl MigrationProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: MigrationStatus) -> MigrationResult {
        MigrationResult {
            row_number: 2,
            description: "Mouse".to_string(),
            code: None,
            status,
            message: "ok".to_string(),
        }
    }

    #[test]
    fn status_round_trip() {
        for s in MigrationStatus::ALL {
            let status = MigrationStatus::from_str(s).unwrap();
            assert_eq!(status.as_str(), *s);
        }
    }

    #[test]
    fn status_unknown_returns_none() {
        assert!(MigrationStatus::from_str("duplicate").is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&MigrationStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }

    #[test]
    fn text_matches_ignores_case_and_padding() {
        assert!(text_matches("  Mouse Logitech ", "mouse logitech"));
        assert!(text_matches("MOCHILA", "mochila"));
        assert!(!text_matches("Mouse", "Mouse pad"));
    }

    #[test]
    fn row_numbers_account_for_header() {
        assert_eq!(spreadsheet_row_number(0), 2);
        assert_eq!(spreadsheet_row_number(9), 11);
    }

    #[test]
    fn effective_code_treats_blank_as_absent() {
        let mut row = CatalogRow {
            description: "Mouse".to_string(),
            price: 10.0,
            code: Some("   ".to_string()),
            category_name: String::new(),
            brand_name: String::new(),
            line_name: String::new(),
            applies_to_all_plans: false,
        };
        assert_eq!(row.effective_code(), None);

        row.code = Some(" MS-1 ".to_string());
        assert_eq!(row.effective_code(), Some("MS-1"));

        row.code = None;
        assert_eq!(row.effective_code(), None);
    }

    #[test]
    fn draft_drops_line_without_category() {
        let mut row = CatalogRow {
            description: " Mouse ".to_string(),
            price: 10.0,
            code: Some(" MS-1 ".to_string()),
            category_name: String::new(),
            brand_name: "Logitech".to_string(),
            line_name: "Tecnología".to_string(),
            applies_to_all_plans: true,
        };
        let draft = ProductDraft::from_row(&row);
        assert_eq!(draft.description, "Mouse");
        assert_eq!(draft.code.as_deref(), Some("MS-1"));
        assert_eq!(draft.category_name, None);
        assert_eq!(draft.line_name, None);
        assert_eq!(draft.brand_name.as_deref(), Some("Logitech"));

        row.category_name = "Accesorios".to_string();
        let draft = ProductDraft::from_row(&row);
        assert_eq!(draft.line_name.as_deref(), Some("Tecnología"));

        let product = NewProduct::from_draft(&draft, Some(3), None);
        assert_eq!(product.category_id, Some(3));
        assert!(product.applies_to_all_plans);
    }

    #[test]
    fn summary_counts_each_status() {
        let results = vec![
            result(MigrationStatus::Created),
            result(MigrationStatus::Created),
            result(MigrationStatus::Updated),
            result(MigrationStatus::Skipped),
            result(MigrationStatus::Error),
        ];
        let summary = MigrationSummary::from_results(&results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.has_changes());
    }

    #[test]
    fn summary_without_writes_has_no_changes() {
        let results = vec![result(MigrationStatus::Skipped), result(MigrationStatus::Error)];
        assert!(!MigrationSummary::from_results(&results).has_changes());
    }

    #[test]
    fn progress_percent() {
        let p = MigrationProgress {
            completed: 1,
            total: 4,
        };
        assert_eq!(p.percent(), 25.0);
        assert!(!p.is_done());
        assert_eq!(MigrationProgress::default().percent(), 100.0);
    }

    #[test]
    fn empty_patch() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            price: Some(1.0),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}

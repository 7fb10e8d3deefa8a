//! Import run history: kinds, statuses and listing bounds.
//!
//! This module lives in `core` so the repository layer and the HTTP handlers
//! agree on the text stored in `import_runs.kind` and `import_runs.status`.

use serde::{Deserialize, Serialize};

use crate::catalog::MigrationSummary;
use crate::codes::CodeAssignmentSummary;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of runs per page.
pub const DEFAULT_RUN_LIMIT: i64 = 20;

/// Maximum number of runs per page.
pub const MAX_RUN_LIMIT: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// Which import flow produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Products,
    ProductCodes,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ProductCodes => "product_codes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "products" => Some(Self::Products),
            "product_codes" => Some(Self::ProductCodes),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] = &["products", "product_codes"];
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportRunStatus {
    Completed,
    Cancelled,
}

impl ImportRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn from_cancelled(cancelled: bool) -> Self {
        if cancelled {
            Self::Cancelled
        } else {
            Self::Completed
        }
    }
}

impl std::fmt::Display for ImportRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Per-status counts persisted with a run.
///
/// Code assignment runs have no `created` rows; rows left untouched
/// (`no_change`, `not_found`, cancelled) count as skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub total_rows: i32,
    pub created: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: i32,
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl From<&MigrationSummary> for RunCounts {
    fn from(s: &MigrationSummary) -> Self {
        Self {
            total_rows: count(s.total),
            created: count(s.created),
            updated: count(s.updated),
            skipped: count(s.skipped),
            errors: count(s.errors),
        }
    }
}

impl From<&CodeAssignmentSummary> for RunCounts {
    fn from(s: &CodeAssignmentSummary) -> Self {
        Self {
            total_rows: count(s.total),
            created: 0,
            updated: count(s.updated),
            skipped: count(s.no_change + s.not_found + s.skipped),
            errors: count(s.errors),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(None, DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT), 20);
        assert_eq!(clamp_limit(Some(0), DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT), 1);
        assert_eq!(clamp_limit(Some(500), DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT), 100);
        assert_eq!(clamp_offset(Some(-3)), 0);
    }

    #[test]
    fn kind_round_trips_through_text() {
        for s in ImportKind::ALL {
            assert_eq!(ImportKind::from_str(s).map(|k| k.as_str()), Some(*s));
        }
        assert_eq!(ImportKind::from_str("combos"), None);
    }

    #[test]
    fn code_summary_folds_untouched_rows_into_skipped() {
        let summary = CodeAssignmentSummary {
            total: 6,
            updated: 2,
            no_change: 1,
            not_found: 1,
            errors: 1,
            skipped: 1,
        };
        let counts = RunCounts::from(&summary);
        assert_eq!(counts.created, 0);
        assert_eq!(counts.updated, 2);
        assert_eq!(counts.skipped, 3);
        assert_eq!(counts.errors, 1);
        assert_eq!(ImportRunStatus::from_cancelled(true).as_str(), "cancelled");
    }
}

//! Reconciliation of one normalized row against the catalog snapshot.
//!
//! Precedence is fixed: validation, then code match, then description
//! match, then create. All text comparisons go through
//! [`text_matches`](crate::catalog::text_matches).

use crate::catalog::{text_matches, CatalogEntry, CatalogRow, ProductPatch};
use crate::types::{prices_differ, Price};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reasons a row is rejected before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RowValidationError {
    #[error("La descripción es requerida")]
    MissingDescription,

    #[error("El precio debe ser mayor a 0")]
    NonPositivePrice,
}

/// Why a matched row is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched by code and description and price already agree.
    Unchanged,
    /// No code match, but another product already uses this description.
    DescriptionTaken,
}

/// The action chosen for a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<'a> {
    Reject(RowValidationError),
    Create,
    Update {
        target: &'a CatalogEntry,
        patch: ProductPatch,
    },
    Skip {
        target: &'a CatalogEntry,
        reason: SkipReason,
    },
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Check the fields every row must carry.
pub fn validate_row(row: &CatalogRow) -> Result<(), RowValidationError> {
    if row.description.trim().is_empty() {
        return Err(RowValidationError::MissingDescription);
    }
    if !(row.price > 0.0) {
        return Err(RowValidationError::NonPositivePrice);
    }
    Ok(())
}

/// First snapshot entry whose code equals `code`.
pub fn find_by_code<'a>(snapshot: &'a [CatalogEntry], code: &str) -> Option<&'a CatalogEntry> {
    snapshot.iter().find(|entry| {
        entry
            .code
            .as_deref()
            .is_some_and(|existing| text_matches(existing, code))
    })
}

/// First snapshot entry whose description equals `description`.
pub fn find_by_description<'a>(
    snapshot: &'a [CatalogEntry],
    description: &str,
) -> Option<&'a CatalogEntry> {
    snapshot
        .iter()
        .find(|entry| text_matches(&entry.description, description))
}

/// Decide what to do with `row` given the snapshot.
pub fn decide<'a>(row: &CatalogRow, snapshot: &'a [CatalogEntry]) -> Decision<'a> {
    if let Err(e) = validate_row(row) {
        return Decision::Reject(e);
    }

    if let Some(target) = row
        .effective_code()
        .and_then(|code| find_by_code(snapshot, code))
    {
        let patch = diff_entry(target, row);
        return if patch.is_empty() {
            Decision::Skip {
                target,
                reason: SkipReason::Unchanged,
            }
        } else {
            Decision::Update { target, patch }
        };
    }

    if let Some(target) = find_by_description(snapshot, &row.description) {
        return Decision::Skip {
            target,
            reason: SkipReason::DescriptionTaken,
        };
    }

    Decision::Create
}

/// Fields of `entry` that differ from `row`. Only description and price are
/// ever compared.
fn diff_entry(entry: &CatalogEntry, row: &CatalogRow) -> ProductPatch {
    let description = (!text_matches(&entry.description, &row.description))
        .then(|| row.description.trim().to_string());
    let price = prices_differ(entry.price, row.price).then_some(row.price);

    ProductPatch {
        description,
        price,
        code: None,
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Operator-facing message for a skipped row.
pub fn skip_message(row: &CatalogRow, target: &CatalogEntry, reason: SkipReason) -> String {
    match reason {
        SkipReason::Unchanged => format!(
            "Producto con código \"{}\" ya tiene la misma descripción y precio (ID: {})",
            row.effective_code().unwrap_or_default(),
            target.id
        ),
        SkipReason::DescriptionTaken => format!(
            "Ya existe producto con esta descripción (ID: {})",
            target.id
        ),
    }
}

/// Operator-facing list of the changes a patch applies to `target`.
pub fn change_summary(target: &CatalogEntry, patch: &ProductPatch) -> String {
    let mut changes = Vec::new();
    if let Some(description) = &patch.description {
        changes.push(format!(
            "descripción: \"{}\" → \"{}\"",
            target.description.trim(),
            description
        ));
    }
    if let Some(price) = patch.price {
        changes.push(format!(
            "precio: ${} → ${}",
            format_price(target.price),
            format_price(price)
        ));
    }
    if let Some(code) = &patch.code {
        changes.push(format!(
            "código: \"{}\" → \"{}\"",
            target.code.as_deref().unwrap_or("sin código"),
            code
        ));
    }
    changes.join(", ")
}

/// Operator-facing message for an applied update.
pub fn update_message(row: &CatalogRow, target: &CatalogEntry, patch: &ProductPatch) -> String {
    format!(
        "Producto actualizado para código \"{}\" (ID: {}). Cambios: {}",
        row.effective_code().unwrap_or_default(),
        target.id,
        change_summary(target, patch)
    )
}

/// Render a price without trailing zero cents.
pub fn format_price(price: Price) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

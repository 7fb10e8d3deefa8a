//! Default financing-plan associations derived from a product's flags.
//!
//! A product opts into plans through three independent flags. The set of
//! default `(product, plan)` associations is a pure function of those flags,
//! the product's category and the active plans ([`default_plan_ids`]).
//! Persisting that set always replaces the previous one wholesale.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::CatalogStore;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Plan-eligibility flags of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFlags {
    pub applies_to_all_plans: bool,
    pub applies_to_category_only: bool,
    pub applies_to_special_plan: bool,
}

impl PlanFlags {
    /// Flags for a product that only opts into every untagged plan.
    pub fn all_plans() -> Self {
        Self {
            applies_to_all_plans: true,
            ..Self::default()
        }
    }

    /// Special-plan eligibility is curated by hand, so a product carrying
    /// only that flag gets no default associations.
    pub fn only_special_plan(&self) -> bool {
        self.applies_to_special_plan
            && !self.applies_to_all_plans
            && !self.applies_to_category_only
    }
}

/// An active financing plan and the categories it is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePlan {
    pub id: DbId,
    pub name: String,
    /// Empty for plans open to every category.
    pub category_ids: Vec<DbId>,
}

impl ActivePlan {
    pub fn is_tagged(&self) -> bool {
        !self.category_ids.is_empty()
    }
}

/// What a cascade needs to know about an existing product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPlanState {
    pub flags: PlanFlags,
    pub category_id: Option<DbId>,
}

/// Failures of the association cascade. Callers log these and carry on.
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("Error obteniendo planes activos: {0}")]
    LoadPlans(#[source] CoreError),

    #[error("Error guardando asociaciones por defecto: {0}")]
    WriteAssociations(#[source] CoreError),
}

// ---------------------------------------------------------------------------
// Pure derivation
// ---------------------------------------------------------------------------

/// Plan ids a product should be associated with by default, ascending and
/// without duplicates.
///
/// - all-plans: every untagged plan (tagged plans never pick up products
///   through this flag)
/// - category-only: every tagged plan whose tags include `category_id`
/// - both: the union
/// - special-plan alone: nothing
pub fn default_plan_ids(
    flags: &PlanFlags,
    category_id: Option<DbId>,
    plans: &[ActivePlan],
) -> Vec<DbId> {
    if flags.only_special_plan() {
        return Vec::new();
    }

    let (tagged, untagged): (Vec<&ActivePlan>, Vec<&ActivePlan>) =
        plans.iter().partition(|plan| plan.is_tagged());

    let mut ids = BTreeSet::new();

    if flags.applies_to_all_plans {
        ids.extend(untagged.iter().map(|plan| plan.id));
    }

    if flags.applies_to_category_only {
        if let Some(category_id) = category_id {
            ids.extend(
                tagged
                    .iter()
                    .filter(|plan| plan.category_ids.contains(&category_id))
                    .map(|plan| plan.id),
            );
        }
    }

    ids.into_iter().collect()
}

/// Whether a flag change requires the associations to be recomputed.
pub fn requires_recompute(old: &PlanFlags, new: &PlanFlags) -> bool {
    old != new
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Delete every default association of `product_id` and write the set
/// derived from `state`. Returns the plan ids written.
pub async fn recompute_default_plans(
    store: &dyn CatalogStore,
    product_id: DbId,
    state: &ProductPlanState,
) -> Result<Vec<DbId>, CascadeError> {
    let plan_ids = if state.flags.only_special_plan() {
        Vec::new()
    } else {
        let plans = store
            .find_active_plans()
            .await
            .map_err(CascadeError::LoadPlans)?;
        default_plan_ids(&state.flags, state.category_id, &plans)
    };

    store
        .replace_default_plans(product_id, &plan_ids)
        .await
        .map_err(CascadeError::WriteAssociations)?;

    tracing::debug!(
        product_id,
        plans = plan_ids.len(),
        "Default plan associations recomputed"
    );

    Ok(plan_ids)
}

/// [`recompute_default_plans`], downgraded to a warning on failure.
pub async fn recompute_best_effort(
    store: &dyn CatalogStore,
    product_id: DbId,
    state: &ProductPlanState,
) -> Option<Vec<DbId>> {
    match recompute_default_plans(store, product_id, state).await {
        Ok(plan_ids) => Some(plan_ids),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "Default plan cascade failed");
            None
        }
    }
}

/// Result of a plan-flag update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFlagsUpdate {
    pub product_id: DbId,
    pub flags: PlanFlags,
    /// Whether any flag differed from the stored value.
    pub changed: bool,
    /// Plan ids written by the cascade; `None` when no recompute happened or
    /// the cascade failed.
    pub default_plan_ids: Option<Vec<DbId>>,
}

/// Persist new flags for a product and, if they changed, recompute its
/// default associations. Cascade failures never fail the update.
pub async fn update_plan_flags(
    store: &dyn CatalogStore,
    product_id: DbId,
    flags: PlanFlags,
) -> Result<PlanFlagsUpdate, CoreError> {
    let current = store
        .find_plan_state(product_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Producto",
            id: product_id,
        })?;

    let changed = requires_recompute(&current.flags, &flags);
    if !changed {
        return Ok(PlanFlagsUpdate {
            product_id,
            flags,
            changed,
            default_plan_ids: None,
        });
    }

    store.update_plan_flags(product_id, &flags).await?;
    tracing::info!(product_id, ?flags, "Product plan flags updated");

    let state = ProductPlanState {
        flags,
        category_id: current.category_id,
    };
    let default_plan_ids = recompute_best_effort(store, product_id, &state).await;

    Ok(PlanFlagsUpdate {
        product_id,
        flags,
        changed,
        default_plan_ids,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

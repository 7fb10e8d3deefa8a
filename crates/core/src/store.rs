//! Persistence port for the catalog import flows.
//!
//! The reconciler never talks to a database directly; it is handed a
//! [`CatalogStore`] at construction time. `mundocuotas-db` provides the
//! PostgreSQL implementation; tests use an in-memory one.

use async_trait::async_trait;

use crate::cascade::{ActivePlan, PlanFlags, ProductPlanState};
use crate::catalog::{CatalogEntry, CreatedProduct, ProductDraft, ProductPatch};
use crate::error::CoreError;
use crate::types::DbId;

/// Failures of [`CatalogStore::create_product_with_taxonomy`], by the step
/// that failed. None of them leaves anything behind.
#[derive(Debug, thiserror::Error)]
pub enum CreateProductError {
    /// Finding or creating the line or the category.
    #[error("Error al obtener/crear categoría: {0}")]
    Category(#[source] CoreError),

    #[error("Error al obtener/crear marca: {0}")]
    Brand(#[source] CoreError),

    /// Inserting the product itself, or committing.
    #[error("{0}")]
    Product(#[source] CoreError),
}

/// Read and write access to the catalog tables an import touches.
///
/// Every method is a single unit of work; callers await each one before the
/// next, so implementations need no cross-call coordination.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // -- Products -----------------------------------------------------------

    /// Snapshot of every product, in id order.
    async fn find_products(&self) -> Result<Vec<CatalogEntry>, CoreError>;

    /// Find or create the draft's line, category and brand (case-insensitive
    /// by name) and insert the product referencing them, atomically. A new
    /// category is created under the draft's line; an existing one keeps
    /// its own.
    async fn create_product_with_taxonomy(
        &self,
        draft: &ProductDraft,
    ) -> Result<CreatedProduct, CreateProductError>;

    /// Write the `Some` fields of `patch` to product `id`.
    async fn update_product(&self, id: DbId, patch: &ProductPatch) -> Result<(), CoreError>;

    /// Current plan flags and category of product `id`, if it exists.
    async fn find_plan_state(&self, id: DbId) -> Result<Option<ProductPlanState>, CoreError>;

    /// Persist the three plan-eligibility flags of product `id`.
    async fn update_plan_flags(&self, id: DbId, flags: &PlanFlags) -> Result<(), CoreError>;

    // -- Financing plans ----------------------------------------------------

    /// Active financing plans with their category tags.
    async fn find_active_plans(&self) -> Result<Vec<ActivePlan>, CoreError>;

    /// Replace every default plan association of `product_id` with
    /// `plan_ids`.
    async fn replace_default_plans(
        &self,
        product_id: DbId,
        plan_ids: &[DbId],
    ) -> Result<(), CoreError>;
}

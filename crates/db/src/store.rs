//! PostgreSQL implementation of the core [`CatalogStore`] port.

use async_trait::async_trait;
use mundocuotas_core::cascade::{ActivePlan, PlanFlags, ProductPlanState};
use mundocuotas_core::catalog::{
    CatalogEntry, CreatedProduct, NewProduct, ProductDraft, ProductPatch,
};
use mundocuotas_core::error::CoreError;
use mundocuotas_core::store::{CatalogStore, CreateProductError};
use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::{
    BrandRepo, CategoryRepo, DefaultPlanRepo, LineRepo, PlanRepo, ProductRepo,
};

/// [`CatalogStore`] backed by the repositories of this crate.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Surface a database failure to the import flows. The text ends up in
/// per-row messages, so it keeps the driver's wording.
fn persistence(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Catalog store query failed");
    CoreError::Persistence(err.to_string())
}

fn product_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Producto",
        id,
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_products(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        let products = ProductRepo::list_all(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(products.into_iter().map(CatalogEntry::from).collect())
    }

    /// Line, category, brand and product are written in one transaction;
    /// any failure drops it and rolls everything back.
    async fn create_product_with_taxonomy(
        &self,
        draft: &ProductDraft,
    ) -> Result<CreatedProduct, CreateProductError> {
        let category_err = |e: sqlx::Error| CreateProductError::Category(persistence(e));
        let brand_err = |e: sqlx::Error| CreateProductError::Brand(persistence(e));
        let product_err = |e: sqlx::Error| CreateProductError::Product(persistence(e));

        let mut tx = self.pool.begin().await.map_err(product_err)?;

        let category_id = match &draft.category_name {
            Some(name) => {
                let line_id = match &draft.line_name {
                    Some(line) => Some(
                        LineRepo::find_or_create_in(&mut tx, line)
                            .await
                            .map_err(category_err)?,
                    ),
                    None => None,
                };
                Some(
                    CategoryRepo::find_or_create_in(&mut tx, name, line_id)
                        .await
                        .map_err(category_err)?,
                )
            }
            None => None,
        };

        let brand_id = match &draft.brand_name {
            Some(name) => Some(
                BrandRepo::find_or_create_in(&mut tx, name)
                    .await
                    .map_err(brand_err)?,
            ),
            None => None,
        };

        let input = NewProduct::from_draft(draft, category_id, brand_id);
        let product = ProductRepo::create_in(&mut tx, &input)
            .await
            .map_err(product_err)?;
        tx.commit().await.map_err(product_err)?;

        tracing::debug!(product_id = product.id, ?category_id, ?brand_id, "Product created");
        Ok(CreatedProduct {
            entry: product.into(),
            category_id,
            brand_id,
        })
    }

    async fn update_product(&self, id: DbId, patch: &ProductPatch) -> Result<(), CoreError> {
        ProductRepo::update(&self.pool, id, patch)
            .await
            .map_err(persistence)?
            .ok_or_else(|| product_not_found(id))?;
        Ok(())
    }

    async fn find_plan_state(&self, id: DbId) -> Result<Option<ProductPlanState>, CoreError> {
        let product = ProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(persistence)?;
        Ok(product.map(|p| p.plan_state()))
    }

    async fn update_plan_flags(&self, id: DbId, flags: &PlanFlags) -> Result<(), CoreError> {
        ProductRepo::update_plan_flags(&self.pool, id, flags)
            .await
            .map_err(persistence)?
            .ok_or_else(|| product_not_found(id))?;
        Ok(())
    }

    async fn find_active_plans(&self) -> Result<Vec<ActivePlan>, CoreError> {
        let rows = PlanRepo::list_active_with_tags(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(ActivePlan::from).collect())
    }

    async fn replace_default_plans(
        &self,
        product_id: DbId,
        plan_ids: &[DbId],
    ) -> Result<(), CoreError> {
        DefaultPlanRepo::replace_for_product(&self.pool, product_id, plan_ids)
            .await
            .map_err(persistence)
    }
}

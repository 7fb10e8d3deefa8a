//! Repository for the `productos` table.

use mundocuotas_core::cascade::PlanFlags;
use mundocuotas_core::catalog::{NewProduct, ProductPatch};
use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::Product;

/// Column list aliased to the [`Product`] field names.
const COLUMNS: &str = "id, descripcion AS description, precio AS price, codigo AS code, \
    fk_id_categoria AS category_id, fk_id_marca AS brand_id, \
    aplica_todos_plan AS applies_to_all_plans, \
    aplica_solo_categoria AS applies_to_category_only, \
    aplica_plan_especial AS applies_to_special_plan, \
    activo AS active, created_at, updated_at";

fn insert_query() -> String {
    format!(
        "INSERT INTO productos
            (descripcion, precio, codigo, fk_id_categoria, fk_id_marca, aplica_todos_plan)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    )
}

/// Provides the product reads and writes the import flows need.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product created from a sheet row, returning the created row.
    ///
    /// Category-only and special-plan flags start out `false`.
    pub async fn create(pool: &PgPool, input: &NewProduct) -> Result<Product, sqlx::Error> {
        let query = insert_query();
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.code)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(input.applies_to_all_plans)
            .fetch_one(pool)
            .await
    }

    /// [`ProductRepo::create`] within an existing transaction.
    pub async fn create_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewProduct,
    ) -> Result<Product, sqlx::Error> {
        let query = insert_query();
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.code)
            .bind(input.category_id)
            .bind(input.brand_id)
            .bind(input.applies_to_all_plans)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM productos WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every product in id order. Inactive products are included so an
    /// import never re-creates something that was only switched off.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM productos ORDER BY id");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Apply a partial update. Only `Some` fields of `patch` are written.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE productos SET
                descripcion = COALESCE($2, descripcion),
                precio = COALESCE($3, precio),
                codigo = COALESCE($4, codigo)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&patch.description)
            .bind(patch.price)
            .bind(&patch.code)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the three plan-eligibility flags.
    pub async fn update_plan_flags(
        pool: &PgPool,
        id: DbId,
        flags: &PlanFlags,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE productos SET
                aplica_todos_plan = $2,
                aplica_solo_categoria = $3,
                aplica_plan_especial = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(flags.applies_to_all_plans)
            .bind(flags.applies_to_category_only)
            .bind(flags.applies_to_special_plan)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `producto_planes_default` table.

use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::DefaultPlanAssociation;

const COLUMNS: &str =
    "id, fk_id_producto AS product_id, fk_id_plan AS plan_id, activo AS active, created_at";

pub struct DefaultPlanRepo;

impl DefaultPlanRepo {
    /// Delete every default association of a product and insert one per
    /// entry of `plan_ids`, in a single transaction.
    pub async fn replace_for_product(
        pool: &PgPool,
        product_id: DbId,
        plan_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM producto_planes_default WHERE fk_id_producto = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        if !plan_ids.is_empty() {
            sqlx::query(
                "INSERT INTO producto_planes_default (fk_id_producto, fk_id_plan, activo)
                 SELECT $1, plan_id, TRUE FROM UNNEST($2::BIGINT[]) AS t(plan_id)
                 ON CONFLICT ON CONSTRAINT uq_producto_planes_default DO NOTHING",
            )
            .bind(product_id)
            .bind(plan_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Default associations of a product, by plan id.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<DefaultPlanAssociation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM producto_planes_default
             WHERE fk_id_producto = $1
             ORDER BY fk_id_plan"
        );
        sqlx::query_as::<_, DefaultPlanAssociation>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }
}

//! Repository for `planes_financiacion` and its category tags.

use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{CreateFinancingPlan, FinancingPlan, TaggedPlanRow};

const COLUMNS: &str = "id, nombre AS name, cuotas AS installments, \
    recargo_porcentual AS percent_surcharge, recargo_fijo AS fixed_surcharge, \
    monto_minimo AS min_amount, monto_maximo AS max_amount, activo AS active, \
    created_at, updated_at";

pub struct PlanRepo;

impl PlanRepo {
    /// Insert a financing plan, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFinancingPlan,
    ) -> Result<FinancingPlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO planes_financiacion
                (nombre, cuotas, recargo_porcentual, recargo_fijo, monto_minimo, monto_maximo, activo)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 0), COALESCE($5, 0), $6, COALESCE($7, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancingPlan>(&query)
            .bind(&input.name)
            .bind(input.installments)
            .bind(input.percent_surcharge)
            .bind(input.fixed_surcharge)
            .bind(input.min_amount)
            .bind(input.max_amount)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// Restrict a plan to a category. Tagging twice is a no-op.
    pub async fn tag_category(
        pool: &PgPool,
        plan_id: DbId,
        category_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO planes_categorias (fk_id_plan, fk_id_categoria)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_planes_categorias DO NOTHING",
        )
        .bind(plan_id)
        .bind(category_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Active plans in id order, each with the ids of the categories it is
    /// tagged with (empty for untagged plans).
    pub async fn list_active_with_tags(pool: &PgPool) -> Result<Vec<TaggedPlanRow>, sqlx::Error> {
        sqlx::query_as::<_, TaggedPlanRow>(
            "SELECT p.id,
                    p.nombre AS name,
                    COALESCE(
                        ARRAY_AGG(pc.fk_id_categoria ORDER BY pc.fk_id_categoria)
                            FILTER (WHERE pc.fk_id_categoria IS NOT NULL),
                        '{}'
                    ) AS category_ids
             FROM planes_financiacion p
             LEFT JOIN planes_categorias pc ON pc.fk_id_plan = p.id
             WHERE p.activo
             GROUP BY p.id, p.nombre
             ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
    }
}

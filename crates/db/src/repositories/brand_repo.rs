//! Repository for the `marcas` table.

use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::taxonomy::Brand;

const COLUMNS: &str = "id, descripcion AS name, created_at, updated_at";

const FIND_OR_CREATE: &str = "WITH existing AS (
        SELECT id FROM marcas
        WHERE LOWER(TRIM(descripcion)) = LOWER(TRIM($1))
        ORDER BY id LIMIT 1
     ), inserted AS (
        INSERT INTO marcas (descripcion)
        SELECT TRIM($1) WHERE NOT EXISTS (SELECT 1 FROM existing)
        RETURNING id
     )
     SELECT id FROM existing UNION ALL SELECT id FROM inserted";

pub struct BrandRepo;

impl BrandRepo {
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marcas
             WHERE LOWER(TRIM(descripcion)) = LOWER(TRIM($1))
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Brand>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Id of the brand named `name`, inserting it (trimmed) if none matches.
    pub async fn find_or_create(pool: &PgPool, name: &str) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(FIND_OR_CREATE)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_or_create_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(FIND_OR_CREATE)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }
}

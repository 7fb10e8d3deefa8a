//! Repository for the `categorias` table.

use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::taxonomy::Category;

const COLUMNS: &str = "id, descripcion AS name, fk_id_linea AS line_id, created_at, updated_at";

const FIND_OR_CREATE: &str = "WITH existing AS (
        SELECT id FROM categorias
        WHERE LOWER(TRIM(descripcion)) = LOWER(TRIM($1))
        ORDER BY id LIMIT 1
     ), inserted AS (
        INSERT INTO categorias (descripcion, fk_id_linea)
        SELECT TRIM($1), $2 WHERE NOT EXISTS (SELECT 1 FROM existing)
        RETURNING id
     )
     SELECT id FROM existing UNION ALL SELECT id FROM inserted";

pub struct CategoryRepo;

impl CategoryRepo {
    /// Case-insensitive lookup by name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categorias
             WHERE LOWER(TRIM(descripcion)) = LOWER(TRIM($1))
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Id of the category named `name`, inserting it under `line_id` if none
    /// matches. An existing category keeps its current line.
    pub async fn find_or_create(
        pool: &PgPool,
        name: &str,
        line_id: Option<DbId>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(FIND_OR_CREATE)
            .bind(name)
            .bind(line_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_or_create_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        line_id: Option<DbId>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(FIND_OR_CREATE)
            .bind(name)
            .bind(line_id)
            .fetch_one(&mut **tx)
            .await
    }
}

//! Repository for the `import_runs` table.

use mundocuotas_core::import_run::{clamp_limit, clamp_offset, DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT};
use mundocuotas_core::types::DbId;
use sqlx::PgPool;

use crate::models::import_run::{CreateImportRun, ImportRun, ImportRunListItem};

/// Column list for full-row queries.
const COLUMNS: &str = "id, kind, file_name, status, total_rows, created, updated, skipped, \
    errors, results, created_at, updated_at";

/// Column list for listings (results omitted).
const LIST_COLUMNS: &str =
    "id, kind, file_name, status, total_rows, created, updated, skipped, errors, created_at";

pub struct ImportRunRepo;

impl ImportRunRepo {
    /// Record a finished run, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateImportRun) -> Result<ImportRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_runs
                (kind, file_name, status, total_rows, created, updated, skipped, errors, results)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(input.kind.as_str())
            .bind(&input.file_name)
            .bind(input.status.as_str())
            .bind(input.counts.total_rows)
            .bind(input.counts.created)
            .bind(input.counts.updated)
            .bind(input.counts.skipped)
            .bind(input.counts.errors)
            .bind(&input.results)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImportRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_runs WHERE id = $1");
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Runs newest first, with clamped pagination.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ImportRunListItem>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {LIST_COLUMNS} FROM import_runs
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ImportRunListItem>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

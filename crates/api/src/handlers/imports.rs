//! Handlers for the bulk catalog imports.
//!
//! Provides endpoints for product and code uploads (multipart), their
//! previews, the downloadable templates, and the import run history.
//!
//! An upload is reconciled inside a spawned task tied to the request by a
//! cancellation guard: if the request is dropped (client gone, timeout),
//! the run stops before its next row and is still recorded as cancelled.

use std::future::Future;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use mundocuotas_core::catalog::{CatalogRow, MigrationProgress};
use mundocuotas_core::codes::{CodeAssignment, CodeAssignmentReport, CodeAssignmentRow};
use mundocuotas_core::error::CoreError;
use mundocuotas_core::import_run::{ImportKind, ImportRunStatus, RunCounts};
use mundocuotas_core::normalizer::{normalize_rows, RawRow};
use mundocuotas_core::reconciler::{MigrationReport, ProductMigration, RunControl};
use mundocuotas_core::types::DbId;
use mundocuotas_db::models::import_run::{CreateImportRun, ImportRun, ImportRunListItem};
use mundocuotas_db::repositories::ImportRunRepo;
use mundocuotas_db::store::PgCatalogStore;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::spreadsheet::{
    self, CODE_TEMPLATE_FILE, PRODUCT_TEMPLATE_FILE, XLSX_CONTENT_TYPE,
};
use crate::state::AppState;

/// Multipart field carrying the workbook.
const FILE_FIELD: &str = "file";

/// Rows returned by the product preview.
const PRODUCT_PREVIEW_ROWS: usize = 5;

/// Rows returned by the code assignment preview.
const CODE_PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A finished import together with the id of its history row. `run_id` is
/// null when the history row could not be written.
#[derive(Debug, Serialize)]
pub struct ImportOutcome<R: Serialize> {
    pub run_id: Option<DbId>,
    pub file_name: String,
    #[serde(flatten)]
    pub report: R,
}

#[derive(Debug, Serialize)]
pub struct ProductPreview {
    pub total_rows: usize,
    pub rows: Vec<CatalogRow>,
}

#[derive(Debug, Serialize)]
pub struct CodePreview {
    /// Rows with both description and code filled.
    pub total_valid_rows: usize,
    pub rows: Vec<CodeAssignmentRow>,
}

#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Upload helpers
// ---------------------------------------------------------------------------

struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// Pull the `file` field out of a multipart body. Other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("El archivo está vacío".to_string()));
        }
        return Ok(Upload { file_name, bytes });
    }

    Err(AppError::BadRequest(format!(
        "Falta el campo '{FILE_FIELD}' con el archivo Excel"
    )))
}

/// Parse an upload into rows. Parsing is CPU-bound, so it runs on the
/// blocking pool.
async fn parse_upload(upload: &Upload) -> AppResult<Vec<RawRow>> {
    let bytes = upload.bytes.clone();
    let rows = tokio::task::spawn_blocking(move || spreadsheet::read_rows(&bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("Workbook parser failed: {e}")))??;
    tracing::info!(file_name = %upload.file_name, rows = rows.len(), "Upload parsed");
    Ok(rows)
}

/// Run `job` on its own task with progress logging, cancelling it if the
/// caller stops waiting.
async fn supervise<T, F, Fut>(job: F) -> AppResult<T>
where
    F: FnOnce(RunControl) -> Fut,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();
    let (tx, mut rx) = watch::channel(MigrationProgress::default());
    let control = RunControl::new().with_progress(tx).with_cancellation(token);

    let mut handle = tokio::spawn(job(control));
    loop {
        tokio::select! {
            joined = &mut handle => {
                return match joined {
                    Ok(result) => result,
                    Err(e) => Err(AppError::InternalError(format!("Import task failed: {e}"))),
                };
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return match (&mut handle).await {
                        Ok(result) => result,
                        Err(e) => Err(AppError::InternalError(format!("Import task failed: {e}"))),
                    };
                }
                let progress = *rx.borrow_and_update();
                tracing::debug!(
                    completed = progress.completed,
                    total = progress.total,
                    percent = progress.percent(),
                    "Import progress"
                );
            }
        }
    }
}

/// Write the history row for a finished import. Failures are logged and
/// yield `None`; the catalog changes of the run stand either way.
async fn record_run<T: Serialize>(
    pool: &mundocuotas_db::DbPool,
    kind: ImportKind,
    file_name: String,
    cancelled: bool,
    counts: RunCounts,
    results: &T,
) -> Option<DbId> {
    let recorded = async {
        let input = CreateImportRun {
            kind,
            file_name,
            status: ImportRunStatus::from_cancelled(cancelled),
            counts,
            results: to_json(results)?,
        };
        Ok::<_, AppError>(ImportRunRepo::create(pool, &input).await?)
    }
    .await;

    match recorded {
        Ok(run) => {
            tracing::info!(run_id = run.id, kind = %kind, status = %run.status, "Import run recorded");
            Some(run.id)
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "Failed to record import run");
            None
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize results: {e}")))
}

fn xlsx_download(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/products
///
/// Reconcile every row of the uploaded workbook against the catalog and
/// return one result per row.
pub async fn import_products(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ImportOutcome<MigrationReport>>>)> {
    let upload = read_upload(multipart).await?;
    let rows = parse_upload(&upload).await?;
    let pool = state.pool.clone();
    let file_name = upload.file_name;

    let outcome = supervise(move |control| async move {
        let store = PgCatalogStore::new(pool.clone());
        let report = ProductMigration::new(&store)
            .with_control(control)
            .run(&rows)
            .await?;

        let run_id = record_run(
            &pool,
            ImportKind::Products,
            file_name.clone(),
            report.cancelled,
            RunCounts::from(&report.summary),
            &report.results,
        )
        .await;

        Ok::<_, AppError>(ImportOutcome {
            run_id,
            file_name,
            report,
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/imports/products/preview
///
/// Normalize the uploaded workbook without touching the catalog.
pub async fn preview_products(
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ProductPreview>>> {
    let upload = read_upload(multipart).await?;
    let rows = parse_upload(&upload).await?;

    Ok(Json(DataResponse {
        data: ProductPreview {
            total_rows: rows.len(),
            rows: normalize_rows(&rows).take(PRODUCT_PREVIEW_ROWS).collect(),
        },
    }))
}

/// GET /api/v1/imports/products/template
pub async fn product_template() -> AppResult<impl IntoResponse> {
    let bytes = spreadsheet::product_template()?;
    Ok(xlsx_download(PRODUCT_TEMPLATE_FILE, bytes))
}

// ---------------------------------------------------------------------------
// Product codes
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/product-codes
///
/// Assign supplier codes to existing products matched by description.
pub async fn import_product_codes(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ImportOutcome<CodeAssignmentReport>>>)> {
    let upload = read_upload(multipart).await?;
    let rows = parse_upload(&upload).await?;
    let pool = state.pool.clone();
    let file_name = upload.file_name;

    let outcome = supervise(move |control| async move {
        let store = PgCatalogStore::new(pool.clone());
        let report = CodeAssignment::new(&store)
            .with_control(control)
            .run(&rows)
            .await?;

        let run_id = record_run(
            &pool,
            ImportKind::ProductCodes,
            file_name.clone(),
            report.cancelled,
            RunCounts::from(&report.summary),
            &report.results,
        )
        .await;

        Ok::<_, AppError>(ImportOutcome {
            run_id,
            file_name,
            report,
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/imports/product-codes/preview
pub async fn preview_product_codes(
    multipart: Multipart,
) -> AppResult<Json<DataResponse<CodePreview>>> {
    let upload = read_upload(multipart).await?;
    let rows = parse_upload(&upload).await?;

    let complete: Vec<CodeAssignmentRow> = rows
        .iter()
        .map(CodeAssignmentRow::from_raw)
        .filter(CodeAssignmentRow::is_complete)
        .collect();

    Ok(Json(DataResponse {
        data: CodePreview {
            total_valid_rows: complete.len(),
            rows: complete.into_iter().take(CODE_PREVIEW_ROWS).collect(),
        },
    }))
}

/// GET /api/v1/imports/product-codes/template
pub async fn code_template() -> AppResult<impl IntoResponse> {
    let bytes = spreadsheet::code_template()?;
    Ok(xlsx_download(CODE_TEMPLATE_FILE, bytes))
}

// ---------------------------------------------------------------------------
// Run history
// ---------------------------------------------------------------------------

/// GET /api/v1/imports/runs
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<ListRunsParams>,
) -> AppResult<Json<DataResponse<Vec<ImportRunListItem>>>> {
    let runs = ImportRunRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /api/v1/imports/runs/{id}
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ImportRun>>> {
    let run = ImportRunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportRun",
            id,
        }))?;
    Ok(Json(DataResponse { data: run }))
}

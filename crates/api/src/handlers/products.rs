//! Handlers for per-product plan settings.

use axum::extract::{Path, State};
use axum::Json;
use mundocuotas_core::cascade::{self, PlanFlags, PlanFlagsUpdate};
use mundocuotas_core::error::CoreError;
use mundocuotas_core::types::DbId;
use mundocuotas_db::models::plan::DefaultPlanAssociation;
use mundocuotas_db::repositories::{DefaultPlanRepo, ProductRepo};
use mundocuotas_db::store::PgCatalogStore;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// PUT /api/v1/products/{id}/plan-flags
///
/// Store the three plan flags and, when they changed, rebuild the
/// product's default plan associations. A failed rebuild is logged and
/// reported as `default_plan_ids: null`; the flags stay saved.
pub async fn update_plan_flags(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(flags): Json<PlanFlags>,
) -> AppResult<Json<DataResponse<PlanFlagsUpdate>>> {
    let store = PgCatalogStore::new(state.pool.clone());
    let update = cascade::update_plan_flags(&store, id, flags).await?;
    Ok(Json(DataResponse { data: update }))
}

/// GET /api/v1/products/{id}/default-plans
pub async fn list_default_plans(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DefaultPlanAssociation>>>> {
    ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Producto",
            id,
        }))?;

    let plans = DefaultPlanRepo::list_for_product(&state.pool, id).await?;
    Ok(Json(DataResponse { data: plans }))
}

//! Product routes mounted at `/products`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// ```text
/// PUT    /{id}/plan-flags        -> update_plan_flags
/// GET    /{id}/default-plans     -> list_default_plans
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/plan-flags", put(products::update_plan_flags))
        .route("/{id}/default-plans", get(products::list_default_plans))
}

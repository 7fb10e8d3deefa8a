pub mod health;
pub mod imports;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /imports/products                      upload product sheet (POST)
/// /imports/products/preview              normalize without writing (POST)
/// /imports/products/template             download template (GET)
/// /imports/product-codes                 upload code sheet (POST)
/// /imports/product-codes/preview         preview complete rows (POST)
/// /imports/product-codes/template        download template (GET)
/// /imports/runs                          list import runs (GET)
/// /imports/runs/{id}                     import run detail (GET)
///
/// /products/{id}/plan-flags              update plan flags (PUT)
/// /products/{id}/default-plans           default plan ids (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/imports", imports::router())
        .nest("/products", products::router())
}

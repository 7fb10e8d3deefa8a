//! Route definitions for bulk catalog imports, mounted at `/imports`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// ```text
/// POST   /products                    -> import_products
/// POST   /products/preview            -> preview_products
/// GET    /products/template           -> product_template
/// POST   /product-codes               -> import_product_codes
/// POST   /product-codes/preview       -> preview_product_codes
/// GET    /product-codes/template      -> code_template
/// GET    /runs                        -> list_runs
/// GET    /runs/{id}                   -> get_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(imports::import_products))
        .route("/products/preview", post(imports::preview_products))
        .route("/products/template", get(imports::product_template))
        .route("/product-codes", post(imports::import_product_codes))
        .route("/product-codes/preview", post(imports::preview_product_codes))
        .route("/product-codes/template", get(imports::code_template))
        .route("/runs", get(imports::list_runs))
        .route("/runs/{id}", get(imports::get_run))
}

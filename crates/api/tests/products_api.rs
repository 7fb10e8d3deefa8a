//! HTTP-level integration tests for plan flags and default plans.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, put_json};
use sqlx::PgPool;

use mundocuotas_core::catalog::NewProduct;
use mundocuotas_db::models::plan::CreateFinancingPlan;
use mundocuotas_db::repositories::{CategoryRepo, PlanRepo, ProductRepo};

async fn create_plan(pool: &PgPool, name: &str) -> i64 {
    PlanRepo::create(
        pool,
        &CreateFinancingPlan {
            name: name.to_string(),
            installments: 12,
            percent_surcharge: None,
            fixed_surcharge: None,
            min_amount: None,
            max_amount: None,
            active: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn create_product(pool: &PgPool, category_id: Option<i64>) -> i64 {
    ProductRepo::create(
        pool,
        &NewProduct {
            description: "Heladera No Frost".to_string(),
            price: 900_000.0,
            code: None,
            category_id,
            brand_id: None,
            applies_to_all_plans: false,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flag_update_rebuilds_default_plans(pool: PgPool) {
    let category = CategoryRepo::find_or_create(&pool, "Línea blanca", None)
        .await
        .unwrap();
    let open = create_plan(&pool, "12 cuotas").await;
    let tagged = create_plan(&pool, "Heladeras 24").await;
    PlanRepo::tag_category(&pool, tagged, category).await.unwrap();
    let product = create_product(&pool, Some(category)).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/products/{product}/plan-flags"),
        serde_json::json!({
            "applies_to_all_plans": true,
            "applies_to_category_only": false,
            "applies_to_special_plan": false,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["changed"], true);
    assert_eq!(json["data"]["default_plan_ids"], serde_json::json!([open]));

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/products/{product}/default-plans")).await).await;
    let plans = json["data"].as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["plan_id"], open);

    let app = common::build_test_app(pool);
    let json = body_json(
        put_json(
            app,
            &format!("/api/v1/products/{product}/plan-flags"),
            serde_json::json!({
                "applies_to_all_plans": false,
                "applies_to_category_only": true,
                "applies_to_special_plan": false,
            }),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["default_plan_ids"], serde_json::json!([tagged]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unchanged_flags_report_no_change(pool: PgPool) {
    let product = create_product(&pool, None).await;

    let app = common::build_test_app(pool);
    let json = body_json(
        put_json(
            app,
            &format!("/api/v1/products/{product}/plan-flags"),
            serde_json::json!({
                "applies_to_all_plans": false,
                "applies_to_category_only": false,
                "applies_to_special_plan": false,
            }),
        )
        .await,
    )
    .await;

    assert_eq!(json["data"]["changed"], false);
    assert!(json["data"]["default_plan_ids"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_product_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        "/api/v1/products/999999/plan-flags",
        serde_json::json!({
            "applies_to_all_plans": true,
            "applies_to_category_only": false,
            "applies_to_special_plan": false,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/products/999999/default-plans").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

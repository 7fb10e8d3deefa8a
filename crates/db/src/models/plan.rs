//! Financing plan models.

use mundocuotas_core::cascade::ActivePlan;
use mundocuotas_core::types::{DbId, Price, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `planes_financiacion` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancingPlan {
    pub id: DbId,
    pub name: String,
    pub installments: i32,
    pub percent_surcharge: f64,
    pub fixed_surcharge: Price,
    pub min_amount: Price,
    pub max_amount: Option<Price>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a financing plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFinancingPlan {
    pub name: String,
    pub installments: i32,
    pub percent_surcharge: Option<f64>,
    pub fixed_surcharge: Option<Price>,
    pub min_amount: Option<Price>,
    pub max_amount: Option<Price>,
    /// Defaults to `true` if omitted.
    pub active: Option<bool>,
}

/// An active plan with its aggregated category tags.
#[derive(Debug, Clone, FromRow)]
pub struct TaggedPlanRow {
    pub id: DbId,
    pub name: String,
    pub category_ids: Vec<DbId>,
}

impl From<TaggedPlanRow> for ActivePlan {
    fn from(row: TaggedPlanRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category_ids: row.category_ids,
        }
    }
}

/// A row from the `producto_planes_default` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DefaultPlanAssociation {
    pub id: DbId,
    pub product_id: DbId,
    pub plan_id: DbId,
    pub active: bool,
    pub created_at: Timestamp,
}

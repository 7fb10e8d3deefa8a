//! Product model.

use mundocuotas_core::cascade::{PlanFlags, ProductPlanState};
use mundocuotas_core::catalog::CatalogEntry;
use mundocuotas_core::types::{DbId, Price, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `productos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub description: String,
    pub price: Price,
    pub code: Option<String>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub applies_to_all_plans: bool,
    pub applies_to_category_only: bool,
    pub applies_to_special_plan: bool,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    pub fn flags(&self) -> PlanFlags {
        PlanFlags {
            applies_to_all_plans: self.applies_to_all_plans,
            applies_to_category_only: self.applies_to_category_only,
            applies_to_special_plan: self.applies_to_special_plan,
        }
    }

    pub fn plan_state(&self) -> ProductPlanState {
        ProductPlanState {
            flags: self.flags(),
            category_id: self.category_id,
        }
    }
}

impl From<Product> for CatalogEntry {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            description: p.description,
            code: p.code,
            price: p.price,
        }
    }
}

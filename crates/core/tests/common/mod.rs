//! In-memory [`CatalogStore`] shared by the core integration tests.
//!
//! Records every write so tests can assert exactly which store calls a run
//! made, and can be told to fail specific operations.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use mundocuotas_core::cascade::{ActivePlan, PlanFlags, ProductPlanState};
use mundocuotas_core::catalog::{
    text_matches, CatalogEntry, CreatedProduct, NewProduct, ProductDraft, ProductPatch,
};
use mundocuotas_core::error::CoreError;
use mundocuotas_core::normalizer::{CellValue, RawRow};
use mundocuotas_core::store::{CatalogStore, CreateProductError};
use mundocuotas_core::types::DbId;

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: DbId,
    pub description: String,
    pub price: f64,
    pub code: Option<String>,
    pub category_id: Option<DbId>,
    pub brand_id: Option<DbId>,
    pub flags: PlanFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCategory {
    pub id: DbId,
    pub name: String,
    pub line_id: Option<DbId>,
}

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FindProducts,
    CreateProduct,
    UpdateProduct,
    FindOrCreateCategory,
    FindOrCreateBrand,
    FindActivePlans,
    ReplaceDefaultPlans,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_id: DbId,
    products: Vec<StoredProduct>,
    lines: Vec<(DbId, String)>,
    categories: Vec<StoredCategory>,
    brands: Vec<(DbId, String)>,
    plans: Vec<ActivePlan>,
    default_plans: BTreeMap<DbId, Vec<DbId>>,
    failing: HashSet<Op>,
    updates: Vec<(DbId, ProductPatch)>,
    creates: usize,
    replace_calls: usize,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, op: Op) -> Result<(), CoreError> {
        if self.failing.contains(&op) {
            Err(CoreError::Persistence(format!("simulated failure in {op:?}")))
        } else {
            Ok(())
        }
    }

    fn line_id(&mut self, name: &str) -> DbId {
        if let Some((id, _)) = self.lines.iter().find(|(_, n)| text_matches(n, name)) {
            return *id;
        }
        let id = self.next_id();
        self.lines.push((id, name.trim().to_string()));
        id
    }

    fn category_id(&mut self, name: &str, line_id: Option<DbId>) -> DbId {
        if let Some(existing) = self.categories.iter().find(|c| text_matches(&c.name, name)) {
            return existing.id;
        }
        let id = self.next_id();
        self.categories.push(StoredCategory {
            id,
            name: name.trim().to_string(),
            line_id,
        });
        id
    }

    fn brand_id(&mut self, name: &str) -> DbId {
        if let Some((id, _)) = self.brands.iter().find(|(_, n)| text_matches(n, name)) {
            return *id;
        }
        let id = self.next_id();
        self.brands.push((id, name.trim().to_string()));
        id
    }

    fn insert_product(&mut self, input: &NewProduct) -> CatalogEntry {
        let id = self.next_id();
        self.creates += 1;
        self.products.push(StoredProduct {
            id,
            description: input.description.clone(),
            price: input.price,
            code: input.code.clone(),
            category_id: input.category_id,
            brand_id: input.brand_id,
            flags: PlanFlags {
                applies_to_all_plans: input.applies_to_all_plans,
                ..PlanFlags::default()
            },
        });
        CatalogEntry {
            id,
            description: input.description.clone(),
            code: input.code.clone(),
            price: input.price,
        }
    }

    /// Apply a draft to this state, step by step, failing where told to.
    fn create_from_draft(
        &mut self,
        draft: &ProductDraft,
    ) -> Result<CreatedProduct, CreateProductError> {
        let category_id = match &draft.category_name {
            Some(name) => {
                let line_id = draft.line_name.as_deref().map(|line| self.line_id(line));
                self.check(Op::FindOrCreateCategory)
                    .map_err(CreateProductError::Category)?;
                Some(self.category_id(name, line_id))
            }
            None => None,
        };

        let brand_id = match &draft.brand_name {
            Some(name) => {
                self.check(Op::FindOrCreateBrand)
                    .map_err(CreateProductError::Brand)?;
                Some(self.brand_id(name))
            }
            None => None,
        };

        self.check(Op::CreateProduct)
            .map_err(CreateProductError::Product)?;
        let entry = self.insert_product(&NewProduct::from_draft(draft, category_id, brand_id));

        Ok(CreatedProduct {
            entry,
            category_id,
            brand_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_product(&self, description: &str, price: f64, code: Option<&str>) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.products.push(StoredProduct {
            id,
            description: description.to_string(),
            price,
            code: code.map(str::to_string),
            category_id: None,
            brand_id: None,
            flags: PlanFlags::default(),
        });
        id
    }

    pub fn seed_category(&self, name: &str) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.categories.push(StoredCategory {
            id,
            name: name.to_string(),
            line_id: None,
        });
        id
    }

    pub fn seed_plan(&self, name: &str, category_ids: &[DbId]) -> DbId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.plans.push(ActivePlan {
            id,
            name: name.to_string(),
            category_ids: category_ids.to_vec(),
        });
        id
    }

    pub fn set_product_state(&self, id: DbId, flags: PlanFlags, category_id: Option<DbId>) {
        let mut state = self.state.lock().unwrap();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .expect("product exists");
        product.flags = flags;
        product.category_id = category_id;
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn products(&self) -> Vec<StoredProduct> {
        self.state.lock().unwrap().products.clone()
    }

    pub fn product(&self, id: DbId) -> StoredProduct {
        self.products()
            .into_iter()
            .find(|p| p.id == id)
            .expect("product exists")
    }

    pub fn categories(&self) -> Vec<StoredCategory> {
        self.state.lock().unwrap().categories.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.lines.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn brands(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.brands.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn default_plans(&self, product_id: DbId) -> Vec<DbId> {
        let state = self.state.lock().unwrap();
        state
            .default_plans
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn updates(&self) -> Vec<(DbId, ProductPatch)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn replace_calls(&self) -> usize {
        self.state.lock().unwrap().replace_calls
    }

    /// Total number of writes of any kind.
    pub fn write_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.creates
            + state.updates.len()
            + state.replace_calls
            + state.lines.len()
            + state.brands.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_products(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        let state = self.state.lock().unwrap();
        state.check(Op::FindProducts)?;
        Ok(state
            .products
            .iter()
            .map(|p| CatalogEntry {
                id: p.id,
                description: p.description.clone(),
                code: p.code.clone(),
                price: p.price,
            })
            .collect())
    }

    /// Works on a copy of the state and keeps it only if every step
    /// succeeds, the way a transaction commits or rolls back.
    async fn create_product_with_taxonomy(
        &self,
        draft: &ProductDraft,
    ) -> Result<CreatedProduct, CreateProductError> {
        let mut state = self.state.lock().unwrap();
        let mut staged = state.clone();
        let created = staged.create_from_draft(draft)?;
        *state = staged;
        Ok(created)
    }

    async fn update_product(&self, id: DbId, patch: &ProductPatch) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.check(Op::UpdateProduct)?;
        state.updates.push((id, patch.clone()));
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::NotFound {
                entity: "Producto",
                id,
            })?;
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(code) = &patch.code {
            product.code = Some(code.clone());
        }
        Ok(())
    }

    async fn find_plan_state(&self, id: DbId) -> Result<Option<ProductPlanState>, CoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| ProductPlanState {
                flags: p.flags,
                category_id: p.category_id,
            }))
    }

    async fn update_plan_flags(&self, id: DbId, flags: &PlanFlags) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
            product.flags = *flags;
        }
        Ok(())
    }

    async fn find_active_plans(&self) -> Result<Vec<ActivePlan>, CoreError> {
        let state = self.state.lock().unwrap();
        state.check(Op::FindActivePlans)?;
        Ok(state.plans.clone())
    }

    async fn replace_default_plans(
        &self,
        product_id: DbId,
        plan_ids: &[DbId],
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.check(Op::ReplaceDefaultPlans)?;
        state.replace_calls += 1;
        state.default_plans.insert(product_id, plan_ids.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

/// A product sheet row using the template headers.
pub fn sheet_row(
    description: &str,
    price: impl Into<CellValue>,
    code: &str,
    category: &str,
    brand: &str,
    line: &str,
    all_plans: bool,
) -> RawRow {
    let mut row = RawRow::new();
    row.insert("Desc. artículo", description);
    row.insert("Precio", price);
    row.insert("Artículo", code);
    row.insert("Agrupación", category);
    row.insert("Marca", brand);
    row.insert("Linea", line);
    row.insert("aplica_todos_plan", all_plans);
    row
}

/// A product sheet row with only description, price and code.
pub fn simple_row(description: &str, price: f64, code: &str) -> RawRow {
    sheet_row(description, price, code, "", "", "", false)
}

pub fn code_row(description: &str, code: &str) -> RawRow {
    [("descripcion", description), ("codigo", code)]
        .into_iter()
        .collect()
}

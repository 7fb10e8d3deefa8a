//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod brand_repo;
pub mod category_repo;
pub mod default_plan_repo;
pub mod import_run_repo;
pub mod line_repo;
pub mod plan_repo;
pub mod product_repo;

pub use brand_repo::BrandRepo;
pub use category_repo::CategoryRepo;
pub use default_plan_repo::DefaultPlanRepo;
pub use import_run_repo::ImportRunRepo;
pub use line_repo::LineRepo;
pub use plan_repo::PlanRepo;
pub use product_repo::ProductRepo;

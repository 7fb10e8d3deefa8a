//! MundoCuotas catalog domain.
//!
//! Pure reconciliation logic for bulk catalog imports: row normalization,
//! matching against the catalog snapshot, the default-plan cascade and the
//! import runs that tie them together. Persistence goes through the
//! [`store::CatalogStore`] port so this crate never depends on a database.

pub mod cascade;
pub mod catalog;
pub mod codes;
pub mod error;
pub mod import_run;
pub mod matcher;
pub mod normalizer;
pub mod reconciler;
pub mod store;
pub mod types;

//! Row structs and DTOs.
//!
//! Tables keep their Spanish column names; every repository aliases them to
//! the English field names used here, so each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the aliased row
//! - A `Deserialize` create DTO where the API or tests insert rows

pub mod import_run;
pub mod plan;
pub mod product;
pub mod taxonomy;

pub mod imports;
pub mod products;

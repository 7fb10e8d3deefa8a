/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Catalog prices are stored as `DOUBLE PRECISION` and compared with
/// [`PRICE_TOLERANCE`].
pub type Price = f64;

/// Two prices closer than this are considered equal.
pub const PRICE_TOLERANCE: Price = 0.01;

/// Whether two prices differ by more than [`PRICE_TOLERANCE`].
pub fn prices_differ(a: Price, b: Price) -> bool {
    (a - b).abs() > PRICE_TOLERANCE
}

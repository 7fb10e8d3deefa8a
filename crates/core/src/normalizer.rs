//! Row normalization for spreadsheet imports.
//!
//! Spreadsheet rows arrive as loosely typed header → cell maps. Everything
//! stringly-typed is resolved here: header aliases, text coercion, price
//! parsing and boolean flags. Downstream code only sees [`CatalogRow`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogRow;
use crate::types::Price;

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Headers accepted for the product description.
pub const DESCRIPTION_COLUMNS: &[&str] = &["descripcion", "Desc. artículo"];

/// Headers accepted for the price.
pub const PRICE_COLUMNS: &[&str] = &["precio", "Precio"];

/// Headers accepted for the supplier code.
pub const CODE_COLUMNS: &[&str] = &["codigo", "Artículo"];

/// Headers accepted for the category name.
pub const CATEGORY_COLUMNS: &[&str] = &["categoria", "Agrupación"];

/// Headers accepted for the brand name.
pub const BRAND_COLUMNS: &[&str] = &["marca", "Marca"];

/// Headers accepted for the product line name.
pub const LINE_COLUMNS: &[&str] = &["linea", "Linea"];

/// Headers accepted for the "applies to all plans" flag.
pub const ALL_PLANS_COLUMNS: &[&str] = &["aplica_todos_plan"];

/// Text values that read as `true` in a flag column (compared lowercase).
const TRUTHY_TEXT: &[&str] = &["true", "1", "yes", "sí"];

// ---------------------------------------------------------------------------
// Cells and raw rows
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as handed over by the workbook reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Empty cells and whitespace-only text carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Render the cell as trimmed text. Whole numbers print without a
    /// fractional part so numeric codes such as `1001` stay `"1001"`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }

    /// Interpret the cell as a price. Anything unparsable or non-finite is `0`.
    pub fn to_price(&self) -> Price {
        let value = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_leading_float(s),
            Self::Empty | Self::Bool(_) => None,
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Interpret the cell as a yes/no flag.
    pub fn to_flag(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => {
                let lower = s.trim().to_lowercase();
                TRUTHY_TEXT.contains(&lower.as_str())
            }
            Self::Empty => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// One data row of a sheet, keyed by header text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(header.into(), value.into());
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// Whether every cell of the row is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }

    /// The first non-blank cell among `aliases`, in alias order.
    pub fn first_value(&self, aliases: &[&str]) -> Option<&CellValue> {
        aliases
            .iter()
            .filter_map(|alias| self.cells.get(*alias))
            .find(|cell| !cell.is_blank())
    }

    /// Trimmed text of the first matching alias, or `""`.
    pub fn text(&self, aliases: &[&str]) -> String {
        self.first_value(aliases)
            .map(CellValue::to_text)
            .unwrap_or_default()
    }

    /// Trimmed text of the first matching alias, or `None` when no alias
    /// carries a value.
    pub fn optional_text(&self, aliases: &[&str]) -> Option<String> {
        self.first_value(aliases).map(CellValue::to_text)
    }

    /// Price of the first alias that resolves to a non-zero amount, or `0`.
    /// A zero or unparseable price under one header falls through to the next.
    pub fn price(&self, aliases: &[&str]) -> Price {
        aliases
            .iter()
            .filter_map(|alias| self.cells.get(*alias))
            .map(CellValue::to_price)
            .find(|price| *price != 0.0)
            .unwrap_or(0.0)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Map one raw row onto the canonical product row shape.
pub fn normalize_row(row: &RawRow) -> CatalogRow {
    CatalogRow {
        description: row.text(DESCRIPTION_COLUMNS),
        price: row.price(PRICE_COLUMNS),
        code: row.optional_text(CODE_COLUMNS),
        category_name: row.text(CATEGORY_COLUMNS),
        brand_name: row.text(BRAND_COLUMNS),
        line_name: row.text(LINE_COLUMNS),
        applies_to_all_plans: row
            .first_value(ALL_PLANS_COLUMNS)
            .map(CellValue::to_flag)
            .unwrap_or(false),
    }
}

/// Lazy sequence of normalized rows over a parsed sheet.
///
/// A clone continues from the same position; calling [`normalize_rows`]
/// again starts over from the first row.
#[derive(Debug, Clone)]
pub struct NormalizedRows<'a> {
    inner: std::slice::Iter<'a, RawRow>,
}

impl Iterator for NormalizedRows<'_> {
    type Item = CatalogRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(normalize_row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for NormalizedRows<'_> {}

/// Normalize every row of a sheet, in input order.
pub fn normalize_rows(rows: &[RawRow]) -> NormalizedRows<'_> {
    NormalizedRows { inner: rows.iter() }
}

/// Parse the longest leading decimal number of `s` (after leading
/// whitespace), the way spreadsheet exports are read by hand: `"150.5 ARS"`
/// reads as `150.5`, `"abc"` as nothing.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Optional exponent, only if it is well formed.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

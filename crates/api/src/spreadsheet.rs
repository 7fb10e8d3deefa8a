//! Workbook I/O for the import endpoints.
//!
//! Uploaded `.xlsx`/`.xls`/`.ods` files are read with `calamine` into
//! [`RawRow`]s: the first sheet only, its first row as headers, fully blank
//! rows dropped. Downloadable templates are written with `rust_xlsxwriter`.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use mundocuotas_core::normalizer::{CellValue, RawRow};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

/// MIME type of generated `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const PRODUCT_TEMPLATE_FILE: &str = "plantilla_productos.xlsx";
pub const CODE_TEMPLATE_FILE: &str = "plantilla_codigos.xlsx";

/// Header row of the product template.
pub const PRODUCT_TEMPLATE_HEADERS: [&str; 7] = [
    "Desc. artículo",
    "Precio",
    "Artículo",
    "Agrupación",
    "Marca",
    "Linea",
    "aplica_todos_plan",
];

/// Header row of the code assignment template.
pub const CODE_TEMPLATE_HEADERS: [&str; 2] = ["descripcion", "codigo"];

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Error al procesar el archivo Excel: {0}")]
    Unreadable(String),

    #[error("El archivo Excel no tiene hojas")]
    NoSheets,

    #[error("Error generando plantilla: {0}")]
    Template(String),
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Header text of a cell; blank for cells that cannot name a column.
fn header_text(data: &Data) -> String {
    to_cell(data).to_text()
}

/// Read the first sheet of a workbook into header-keyed rows.
///
/// Columns with a blank header are ignored; a sheet with only a header row
/// yields no rows.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<RawRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheets)?
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    let parsed: Vec<RawRow> = rows
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), to_cell(cell)))
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_blank())
        .collect();

    tracing::debug!(rows = parsed.len(), columns = headers.len(), "Workbook parsed");
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        sheet.set_column_width(col as u16, 22)?;
    }
    Ok(())
}

fn build_product_template() -> Result<Vec<u8>, XlsxError> {
    let examples: [(&str, f64, &str, &str, &str, &str, bool); 2] = [
        (
            "Ejemplo: Notebook HP 15.6",
            150_000.0,
            "NB-HP-001",
            "Notebooks",
            "HP",
            "Tecnología",
            true,
        ),
        (
            "Ejemplo: Mouse Logitech",
            5_000.0,
            "MS-LG-001",
            "Accesorios",
            "Logitech",
            "Tecnología",
            false,
        ),
    ];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Productos")?;
    write_headers(sheet, &PRODUCT_TEMPLATE_HEADERS)?;

    for (i, (description, price, code, category, brand, line, all_plans)) in
        examples.iter().enumerate()
    {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *description)?;
        sheet.write_number(row, 1, *price)?;
        sheet.write_string(row, 2, *code)?;
        sheet.write_string(row, 3, *category)?;
        sheet.write_string(row, 4, *brand)?;
        sheet.write_string(row, 5, *line)?;
        sheet.write_boolean(row, 6, *all_plans)?;
    }

    workbook.save_to_buffer()
}

fn build_code_template() -> Result<Vec<u8>, XlsxError> {
    let examples = [
        ("Ejemplo: Notebook HP 15.6", "NB-HP-001"),
        ("Ejemplo: Mouse Logitech", "MS-LG-001"),
        ("Ejemplo: Teclado Mecánico", "KB-MECH-001"),
    ];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Codigos")?;
    write_headers(sheet, &CODE_TEMPLATE_HEADERS)?;

    for (i, (description, code)) in examples.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *description)?;
        sheet.write_string(row, 1, *code)?;
    }

    workbook.save_to_buffer()
}

/// `plantilla_productos.xlsx`: sheet "Productos" with two example rows.
pub fn product_template() -> Result<Vec<u8>, SpreadsheetError> {
    build_product_template().map_err(|e| SpreadsheetError::Template(e.to_string()))
}

/// `plantilla_codigos.xlsx`: sheet "Codigos" with three example rows.
pub fn code_template() -> Result<Vec<u8>, SpreadsheetError> {
    build_code_template().map_err(|e| SpreadsheetError::Template(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

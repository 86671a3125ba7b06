#![cfg(not(tarpaulin_include))]

use crate::error::LoadError;
use crate::table::{CellValue, RecordTable, required_columns};
use calamine::{Data, DataType, Range, Reader, Xlsx, open_workbook_auto_from_rs};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

lazy_static! {
    /// Tables already read by [`load_cached`], keyed by the path they came from
    static ref DATASETS: Mutex<HashMap<PathBuf, Arc<RecordTable>>> = Mutex::new(HashMap::new());
}

/// Load the comparison dataset once per process
///
/// The first call for a given path reads and validates the file through
/// [`load_dataset`]; later calls hand out the same shared table. The cache
/// lock is held while the first read runs, so concurrent first requests
/// still read the file only once. Failed loads are not cached.
///
/// # Examples
/// ```no_run
/// use part_lookup::loader::load_cached;
///
/// let table = load_cached("賀展_比對結果.xlsx").expect("dataset");
/// println!("{} rows", table.len());
/// ```
pub fn load_cached(path: impl AsRef<Path>) -> Result<Arc<RecordTable>, LoadError> {
    let path = path.as_ref();
    let mut datasets = DATASETS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(table) = datasets.get(path) {
        return Ok(Arc::clone(table));
    }

    let table = Arc::new(load_dataset(path)?);
    datasets.insert(path.to_path_buf(), Arc::clone(&table));
    Ok(table)
}

/// Load a spreadsheet and check that every lookup column is present
///
/// No other schema validation is done; extra columns pass through untouched.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<RecordTable, LoadError> {
    let path = path.as_ref();
    let table = load_spreadsheet(path)?;

    for column in required_columns() {
        if table.column_index(column).is_none() {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    log::info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

/// Detect file type and load appropriate format
///
/// This function examines the file extension, reads the file and calls the
/// appropriate parser for CSV or workbook contents.
///
/// # Arguments
/// * `filepath` - Path to the file to load
///
/// # Returns
/// * `Result<RecordTable, LoadError>` - The loaded table or an error
pub fn load_spreadsheet(filepath: impl AsRef<Path>) -> Result<RecordTable, LoadError> {
    let path = filepath.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let is_csv = match extension.as_deref() {
        Some("csv") => true,
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => false,
        Some(ext) => return Err(LoadError::UnsupportedFormat(format!(".{}", ext))),
        None => return Err(LoadError::UnsupportedFormat("file has no extension".to_string())),
    };

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if is_csv {
        from_csv_reader(bytes.as_slice())
    } else {
        from_workbook_bytes(bytes)
    }
}

/// Load the first worksheet of an Excel or OpenDocument workbook held in memory
///
/// The format is detected from the contents. The first row is taken as the
/// header row.
pub fn from_workbook_bytes(bytes: Vec<u8>) -> Result<RecordTable, LoadError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| LoadError::Excel(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Excel("no worksheets found".to_string()))?
        .map_err(|e| LoadError::Excel(e.to_string()))?;

    table_from_range(&range)
}

/// Load the first worksheet of an in-memory xlsx document
pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<RecordTable, LoadError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| LoadError::Excel(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Excel("no worksheets found".to_string()))?
        .map_err(|e| LoadError::Excel(e.to_string()))?;

    table_from_range(&range)
}

/// Load CSV data whose first record is the header row
///
/// Field text is kept as written. Fields that parse as finite numbers become
/// [`CellValue::Number`].
pub fn from_csv_reader(input: impl Read) -> Result<RecordTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| header_name(h, idx))
        .collect::<Vec<_>>();

    if headers.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<CellValue> = record.iter().map(csv_cell).collect();
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(RecordTable::new(headers, rows))
}

fn table_from_range(range: &Range<Data>) -> Result<RecordTable, LoadError> {
    let mut rows = range.rows();

    let headers = rows
        .next()
        .ok_or(LoadError::Empty)?
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(&excel_cell(cell).to_string(), idx))
        .collect::<Vec<_>>();

    let records = rows
        .map(|row| row.iter().map(excel_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    Ok(RecordTable::new(headers, records))
}

// Blank headers are named the way pandas names them
fn header_name(raw: &str, idx: usize) -> String {
    if raw.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        raw.to_string()
    }
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn csv_cell(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

use crate::error::ExportError;
use crate::filter::FilteredResult;
use crate::table::{CellValue, RecordTable};
use rust_xlsxwriter::{Workbook, Worksheet};

/// Name of the single worksheet in exported workbooks
pub const SHEET_NAME: &str = "篩選結果";

/// Suggested download name for exported workbooks
pub const XLSX_FILE_NAME: &str = "篩選結果.xlsx";

/// Suggested download name for exported CSV files
pub const CSV_FILE_NAME: &str = "篩選結果.csv";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Convert a table to XLSX format
///
/// This function exports a table to XLSX (Excel) format using the rust_xlsxwriter library.
/// The first row holds the original column headers, no index column is added, and
/// everything lands on one sheet named [`SHEET_NAME`].
///
/// # Arguments
/// * `table` - Reference to the table to convert
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use part_lookup::downloader::to_xlsx;
/// use part_lookup::table::{CellValue, RecordTable};
///
/// let table = RecordTable::new(vec!["itm_no".into()], vec![vec![CellValue::Text("A1".into())]]);
/// match to_xlsx(&table) {
///     Ok(xlsx_data) => println!("XLSX generated: {} bytes", xlsx_data.len()),
///     Err(e) => eprintln!("Failed to generate XLSX: {}", e),
/// }
/// ```
pub fn to_xlsx(table: &RecordTable) -> Result<Vec<u8>, ExportError> {
    write_xlsx(table.headers(), table.rows().iter().map(Vec::as_slice))
}

/// Convert the rows of a filtered result to XLSX format
pub fn result_to_xlsx(result: &FilteredResult<'_>) -> Result<Vec<u8>, ExportError> {
    write_xlsx(result.headers(), result.rows())
}

/// Convert a table to CSV format
///
/// The output is UTF-8 with a byte-order mark so spreadsheet programs pick the
/// right encoding for the Chinese column names.
pub fn to_csv(table: &RecordTable) -> Result<Vec<u8>, ExportError> {
    write_csv(table.headers(), table.rows().iter().map(Vec::as_slice))
}

/// Convert the rows of a filtered result to CSV format
pub fn result_to_csv(result: &FilteredResult<'_>) -> Result<Vec<u8>, ExportError> {
    write_csv(result.headers(), result.rows())
}

fn write_xlsx<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a [CellValue]>,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_NAME)?;

    for (c, header) in headers.iter().enumerate() {
        worksheet.write_string(0, c as u16, header)?;
    }

    for (r, row) in rows.enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                CellValue::DateTime(_) => {
                    worksheet.write_string(r, c, &cell.to_string())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

fn write_csv<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a [CellValue]>,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RecordTable {
        RecordTable::new(
            vec!["itm_no".into(), "desc".into(), "尺寸_解析".into()],
            vec![
                vec![
                    CellValue::Text("A1".into()),
                    CellValue::Text("Cable, red".into()),
                    CellValue::Number(2.0),
                ],
                vec![CellValue::Text("A2".into()), CellValue::Empty, CellValue::Number(3.5)],
            ],
        )
    }

    #[test]
    fn csv_has_bom_headers_and_quoted_fields() {
        let bytes = to_csv(&table()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["itm_no,desc,尺寸_解析", "A1,\"Cable, red\",2", "A2,,3.5"]);
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&table()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn header_only_export_for_empty_table() {
        let empty = RecordTable::new(vec!["itm_no".into()], Vec::new());
        let bytes = to_csv(&empty).unwrap();
        assert_eq!(&bytes[UTF8_BOM.len()..], b"itm_no\n");
        assert!(to_xlsx(&empty).is_ok());
    }
}

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Column holding the part number
pub const ITEM_NUMBER_COLUMN: &str = "itm_no";

/// Column holding the product description
pub const DESCRIPTION_COLUMN: &str = "desc";

/// A single cell value read from the source spreadsheet
///
/// Filters compare cells through their display form, so a numeric item
/// number such as `1203.0` matches the selection `"1203"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank cell (NaN in the source workbook)
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Returns true for blank cells
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Exact match of the cell's display form against `needle`
    pub fn matches(&self, needle: &str) -> bool {
        match self {
            CellValue::Text(s) => s == needle,
            CellValue::Empty => needle.is_empty(),
            other => other.to_string() == needle,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => {
                if dt.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::DateTime(_) => serializer.collect_str(self),
        }
    }
}

/// One of the four attribute columns usable for multi-value filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    /// Rating class (度數)
    Rating,
    Size,
    SizeUnit,
    Color,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Rating,
        Classification::Size,
        Classification::SizeUnit,
        Classification::Color,
    ];

    /// Source column name in the comparison workbook
    pub fn column(self) -> &'static str {
        match self {
            Classification::Rating => "度數_解析",
            Classification::Size => "尺寸_解析",
            Classification::SizeUnit => "尺寸單位_解析",
            Classification::Color => "顏色_解析",
        }
    }

    /// Short caption shown next to the selection widget
    pub fn caption(self) -> &'static str {
        match self {
            Classification::Rating => "度數",
            Classification::Size => "尺寸",
            Classification::SizeUnit => "尺寸單位",
            Classification::Color => "顏色",
        }
    }

    /// Query-string key used by the search form
    pub fn key(self) -> &'static str {
        match self {
            Classification::Rating => "rating",
            Classification::Size => "size",
            Classification::SizeUnit => "size_unit",
            Classification::Color => "color",
        }
    }
}

/// Every column the lookup needs to find in the header row
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    [ITEM_NUMBER_COLUMN, DESCRIPTION_COLUMN]
        .into_iter()
        .chain(Classification::ALL.into_iter().map(Classification::column))
}

/// In-memory tabular dataset loaded from the source spreadsheet
///
/// Rows keep the order of the source file. Every row has exactly one cell per
/// header; short rows are padded with [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    /// Build a table from a header row and data rows
    ///
    /// # Arguments
    /// * `headers` - Column names, in display order
    /// * `rows` - Data rows; each is padded or truncated to `headers.len()`
    ///
    /// # Examples
    /// ```
    /// use part_lookup::table::{CellValue, RecordTable};
    ///
    /// let table = RecordTable::new(
    ///     vec!["itm_no".to_string(), "desc".to_string()],
    ///     vec![vec![CellValue::Text("A1".to_string())]],
    /// );
    /// assert_eq!(table.rows()[0].len(), 2);
    /// ```
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column named `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of column `name` in row `row`
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Distinct non-empty display values of a column, in first-occurrence order
    ///
    /// Returns an empty list when the column does not exist.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        match self.column_index(name) {
            Some(col) => distinct_in(self.rows.iter().map(|r| &r[col])),
            None => Vec::new(),
        }
    }
}

/// Distinct non-empty display values, keeping first-occurrence order
pub(crate) fn distinct_in<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for cell in cells {
        if cell.is_empty() {
            continue;
        }
        let text = cell.to_string();
        if seen.insert(text.clone()) {
            values.push(text);
        }
    }
    values
}

/// Convert column number to letter (A=1, B=2, etc.)
///
/// # Examples
/// ```
/// use part_lookup::table::column_to_letter;
///
/// assert_eq!(column_to_letter(1), "A");
/// assert_eq!(column_to_letter(26), "Z");
/// assert_eq!(column_to_letter(27), "AA");
/// assert_eq!(column_to_letter(52), "AZ");
/// ```
pub fn column_to_letter(col: u16) -> String {
    let mut name = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        name.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }

    name
}

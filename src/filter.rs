//! Filter engine: turns user selections into a subset of the record table

use std::collections::{BTreeMap, BTreeSet};

use crate::table::{
    CellValue, Classification, DESCRIPTION_COLUMN, ITEM_NUMBER_COLUMN, RecordTable, distinct_in,
};

/// Per-column selection state for classification search.
/// A column that is absent or has an empty set imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSelection {
    selected: BTreeMap<Classification, BTreeSet<String>>,
}

impl ClassificationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add permitted values for one column; values within a column are OR-ed
    pub fn with<I, S>(mut self, column: Classification, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected
            .entry(column)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Values selected for a column (empty when unconstrained)
    pub fn values(&self, column: Classification) -> impl Iterator<Item = &str> {
        self.selected
            .get(&column)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn is_selected(&self, column: Classification, value: &str) -> bool {
        self.selected
            .get(&column)
            .is_some_and(|set| set.contains(value))
    }

    fn active(&self) -> impl Iterator<Item = (Classification, &BTreeSet<String>)> {
        self.selected
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(col, set)| (*col, set))
    }
}

/// The active user-selected constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Criteria {
    /// Identity filter: every row matches
    #[default]
    All,
    /// Exact item-number match, falling back to exact description match
    Identifier {
        item_number: Option<String>,
        description: Option<String>,
    },
    /// AND across classification columns, OR within one column
    Classification(ClassificationSelection),
}

impl Criteria {
    /// Identifier search; blank selections count as "nothing selected"
    pub fn identifier(item_number: Option<&str>, description: Option<&str>) -> Self {
        Criteria::Identifier {
            item_number: non_blank(item_number).map(str::to_string),
            description: non_blank(description).map(str::to_string),
        }
    }
}

// Whitespace-only means "nothing selected"; any other value is kept verbatim
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whether a search found anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found(usize),
    /// Nothing matched; a normal outcome, not a failure
    NoMatch,
}

/// Read-only view of the rows of a [`RecordTable`] that satisfied a [`Criteria`]
///
/// Rows are referenced by index and stay in table order.
#[derive(Debug, Clone)]
pub struct FilteredResult<'a> {
    table: &'a RecordTable,
    indices: Vec<usize>,
}

impl<'a> FilteredResult<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row positions in the source table
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn headers(&self) -> &'a [String] {
        self.table.headers()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [CellValue]> + '_ {
        let rows = self.table.rows();
        self.indices.iter().map(move |&i| rows[i].as_slice())
    }

    pub fn status(&self) -> SearchStatus {
        if self.indices.is_empty() {
            SearchStatus::NoMatch
        } else {
            SearchStatus::Found(self.indices.len())
        }
    }

    /// Copy the matching rows into an owned table
    pub fn to_table(&self) -> RecordTable {
        RecordTable::new(
            self.table.headers().to_vec(),
            self.rows().map(<[CellValue]>::to_vec).collect(),
        )
    }
}

/// Compute the rows of `table` that satisfy `criteria`
///
/// The table is never modified. Comparisons are exact matches on the cell's
/// display form. A constraint on a column the table lacks matches nothing.
///
/// # Examples
/// ```
/// use part_lookup::filter::{Criteria, apply_filters};
/// use part_lookup::table::{CellValue, RecordTable};
///
/// let table = RecordTable::new(
///     vec!["itm_no".to_string()],
///     vec![
///         vec![CellValue::Text("A1".into())],
///         vec![CellValue::Text("A2".into())],
///     ],
/// );
/// let result = apply_filters(&table, &Criteria::identifier(Some("A2"), None));
/// assert_eq!(result.indices(), &[1]);
/// ```
pub fn apply_filters<'a>(table: &'a RecordTable, criteria: &Criteria) -> FilteredResult<'a> {
    let all = 0..table.len();
    let indices = match criteria {
        Criteria::All => all.collect(),
        Criteria::Identifier {
            item_number: Some(item),
            ..
        } => matching(table, ITEM_NUMBER_COLUMN, all, |cell| cell.matches(item)),
        Criteria::Identifier {
            item_number: None,
            description: Some(desc),
        } => matching(table, DESCRIPTION_COLUMN, all, |cell| cell.matches(desc)),
        Criteria::Identifier { .. } => all.collect(),
        Criteria::Classification(selection) => {
            let mut indices: Vec<usize> = all.collect();
            for (column, permitted) in selection.active() {
                indices = matching(table, column.column(), indices, |cell| {
                    permitted.contains(&cell.to_string())
                });
            }
            indices
        }
    };

    log::debug!("{:?} matched {} of {} rows", criteria, indices.len(), table.len());
    FilteredResult { table, indices }
}

fn matching(
    table: &RecordTable,
    column: &str,
    candidates: impl IntoIterator<Item = usize>,
    predicate: impl Fn(&CellValue) -> bool,
) -> Vec<usize> {
    let Some(col) = table.column_index(column) else {
        return Vec::new();
    };
    let rows = table.rows();
    candidates
        .into_iter()
        .filter(|&i| predicate(&rows[i][col]))
        .collect()
}

/// Every item number offered in the part-number selector
pub fn item_number_choices(table: &RecordTable) -> Vec<String> {
    table.distinct_values(ITEM_NUMBER_COLUMN)
}

/// Descriptions offered once an item number is chosen
///
/// With no item number this is every description; otherwise it is
/// `distinct(desc where itm_no == item_number)`.
pub fn description_choices(table: &RecordTable, item_number: Option<&str>) -> Vec<String> {
    narrowed(table, DESCRIPTION_COLUMN, ITEM_NUMBER_COLUMN, item_number)
}

/// Item numbers offered once a description is chosen
pub fn item_number_choices_for(table: &RecordTable, description: Option<&str>) -> Vec<String> {
    narrowed(table, ITEM_NUMBER_COLUMN, DESCRIPTION_COLUMN, description)
}

/// Values offered in a classification multi-select
pub fn classification_choices(table: &RecordTable, column: Classification) -> Vec<String> {
    table.distinct_values(column.column())
}

fn narrowed(table: &RecordTable, target: &str, key: &str, selected: Option<&str>) -> Vec<String> {
    let Some(selected) = non_blank(selected) else {
        return table.distinct_values(target);
    };
    let (Some(target_col), Some(key_col)) = (table.column_index(target), table.column_index(key))
    else {
        return Vec::new();
    };
    distinct_in(
        table
            .rows()
            .iter()
            .filter(|row| row[key_col].matches(selected))
            .map(|row| &row[target_col]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn headers() -> Vec<String> {
        vec![
            "itm_no".into(),
            "desc".into(),
            "度數_解析".into(),
            "尺寸_解析".into(),
            "尺寸單位_解析".into(),
            "顏色_解析".into(),
        ]
    }

    fn sample() -> RecordTable {
        let row = |itm: &str, desc: &str, rating: &str, size: CellValue, unit: &str, color: &str| {
            vec![text(itm), text(desc), text(rating), size, text(unit), text(color)]
        };
        RecordTable::new(
            headers(),
            vec![
                row("A1", "Cable red", "110V", CellValue::Number(2.0), "mm2", "紅"),
                row("A2", "Cable blue", "220V", CellValue::Number(3.5), "mm2", "藍"),
                row("A1", "Cable red alt", "110V", CellValue::Number(2.0), "AWG", "紅"),
                row("B7", "Cable red", "600V", CellValue::Empty, "AWG", "黑"),
            ],
        )
    }

    fn rows_of(result: &FilteredResult<'_>) -> Vec<Vec<CellValue>> {
        result.rows().map(<[CellValue]>::to_vec).collect()
    }

    #[test]
    fn item_number_returns_all_duplicates_in_order() {
        let table = sample();
        let result = apply_filters(&table, &Criteria::identifier(Some("A1"), None));
        assert_eq!(result.indices(), &[0, 2]);
        assert_eq!(result.status(), SearchStatus::Found(2));
    }

    #[test]
    fn item_number_takes_precedence_over_description() {
        let table = sample();
        let result = apply_filters(&table, &Criteria::identifier(Some("A2"), Some("Cable red")));
        assert_eq!(result.indices(), &[1]);
    }

    #[test]
    fn description_used_when_no_item_number() {
        let table = sample();
        let result = apply_filters(&table, &Criteria::identifier(Some("  "), Some("Cable red")));
        assert_eq!(result.indices(), &[0, 3]);
    }

    #[test]
    fn padded_item_number_matches_exactly() {
        let table = RecordTable::new(
            headers(),
            vec![vec![text("A1 "), text("Cable")], vec![text("A1"), text("Other")]],
        );
        assert_eq!(item_number_choices(&table), vec!["A1 ", "A1"]);

        let padded = apply_filters(&table, &Criteria::identifier(Some("A1 "), None));
        assert_eq!(padded.indices(), &[0]);
        assert_eq!(description_choices(&table, Some("A1 ")), vec!["Cable"]);

        let bare = apply_filters(&table, &Criteria::identifier(Some("A1"), None));
        assert_eq!(bare.indices(), &[1]);
        assert_eq!(description_choices(&table, Some("A1")), vec!["Other"]);
    }

    #[test]
    fn identifier_without_selection_is_identity() {
        let table = sample();
        let result = apply_filters(&table, &Criteria::identifier(None, Some("")));
        assert_eq!(result.len(), table.len());
    }

    #[test]
    fn single_rating_selection_ignores_other_columns() {
        let table = sample();
        let criteria =
            Criteria::Classification(ClassificationSelection::new().with(Classification::Rating, ["110V"]));
        let result = apply_filters(&table, &criteria);
        assert_eq!(result.indices(), &[0, 2]);
    }

    #[test]
    fn classification_ands_columns_and_ors_values() {
        let table = sample();
        let selection = ClassificationSelection::new()
            .with(Classification::Rating, ["110V", "600V"])
            .with(Classification::SizeUnit, ["AWG"]);
        let result = apply_filters(&table, &Criteria::Classification(selection));
        assert_eq!(result.indices(), &[2, 3]);
    }

    #[test]
    fn numeric_cells_match_their_display_form() {
        let table = sample();
        let selection = ClassificationSelection::new().with(Classification::Size, ["2"]);
        let result = apply_filters(&table, &Criteria::Classification(selection));
        assert_eq!(result.indices(), &[0, 2]);
    }

    #[test]
    fn unknown_value_is_no_match_not_error() {
        let table = sample();
        let selection = ClassificationSelection::new().with(Classification::Color, ["綠"]);
        let result = apply_filters(&table, &Criteria::Classification(selection));
        assert!(result.is_empty());
        assert_eq!(result.status(), SearchStatus::NoMatch);
    }

    #[test]
    fn empty_cells_need_explicit_empty_selection() {
        let table = sample();
        let any_size = ClassificationSelection::new().with(Classification::Size, ["2", "3.5"]);
        assert_eq!(apply_filters(&table, &Criteria::Classification(any_size)).indices(), &[0, 1, 2]);

        let blank = ClassificationSelection::new().with(Classification::Size, [""]);
        assert_eq!(apply_filters(&table, &Criteria::Classification(blank)).indices(), &[3]);
    }

    #[test]
    fn missing_column_matches_nothing() {
        let table = RecordTable::new(vec!["itm_no".into()], vec![vec![text("A1")]]);
        let selection = ClassificationSelection::new().with(Classification::Color, ["紅"]);
        assert!(apply_filters(&table, &Criteria::Classification(selection)).is_empty());
    }

    #[test]
    fn empty_criteria_is_identity() {
        let table = sample();
        for criteria in [
            Criteria::All,
            Criteria::identifier(None, None),
            Criteria::Classification(ClassificationSelection::new()),
            Criteria::Classification(ClassificationSelection::new().with(Classification::Color, Vec::<String>::new())),
        ] {
            let result = apply_filters(&table, &criteria);
            assert_eq!(result.to_table(), table);
        }
    }

    #[test]
    fn filtering_is_idempotent_and_a_subset() {
        let table = sample();
        let criteria = Criteria::Classification(
            ClassificationSelection::new()
                .with(Classification::Color, ["紅", "黑"])
                .with(Classification::SizeUnit, ["AWG"]),
        );
        let once = apply_filters(&table, &criteria);
        assert!(once.indices().iter().all(|&i| i < table.len()));
        assert!(once.indices().windows(2).all(|w| w[0] < w[1]));

        let once_table = once.to_table();
        let twice = apply_filters(&once_table, &criteria);
        assert_eq!(rows_of(&twice), rows_of(&once));
    }

    #[test]
    fn adding_a_constraint_only_narrows() {
        let table = sample();
        let base = ClassificationSelection::new().with(Classification::Color, ["紅", "藍"]);
        let narrower = base.clone().with(Classification::Rating, ["110V"]);

        let wide = apply_filters(&table, &Criteria::Classification(base));
        let narrow = apply_filters(&table, &Criteria::Classification(narrower));
        assert!(narrow.len() <= wide.len());
        assert!(narrow.indices().iter().all(|i| wide.indices().contains(i)));
    }

    #[test]
    fn item_number_narrows_description_choices() {
        let table = sample();
        assert_eq!(
            description_choices(&table, Some("A1")),
            vec!["Cable red", "Cable red alt"]
        );
        assert_eq!(description_choices(&table, None).len(), 3);
        assert!(description_choices(&table, Some("Z9")).is_empty());
    }

    #[test]
    fn description_narrows_item_number_choices() {
        let table = sample();
        assert_eq!(item_number_choices_for(&table, Some("Cable red")), vec!["A1", "B7"]);
        assert_eq!(item_number_choices(&table), vec!["A1", "A2", "B7"]);
    }

    #[test]
    fn classification_choices_skip_blanks() {
        let table = sample();
        assert_eq!(classification_choices(&table, Classification::Size), vec!["2", "3.5"]);
    }
}

use serde::Serialize;

use crate::config::Config;
use crate::filter::{
    FilteredResult, apply_filters, classification_choices, description_choices,
    item_number_choices, non_blank,
};
use crate::form::{SearchMode, SearchQuery};
use crate::table::{Classification, RecordTable, column_to_letter};

/// One entry of a select widget
#[derive(Debug, Serialize)]
pub struct Choice {
    pub value: String,
    pub selected: bool,
}

/// A multi-select over one classification column
#[derive(Debug, Serialize)]
pub struct ClassificationWidget {
    pub key: &'static str,
    pub label: String,
    pub choices: Vec<Choice>,
}

/// Everything the search page template renders
#[derive(Debug, Serialize)]
pub struct PageView {
    pub title: String,
    pub filter_enabled: bool,
    pub auto_search: bool,
    pub identifier_mode: bool,
    pub item_numbers: Vec<Choice>,
    pub descriptions: Vec<Choice>,
    pub classifications: Vec<ClassificationWidget>,
    pub found: bool,
    pub count: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Query string carried over to the export links
    pub export_query: String,
}

impl PageView {
    /// Run the search described by `query` and lay out the page for it
    pub fn build(
        table: &RecordTable,
        config: &Config,
        query: &SearchQuery,
        raw_query: Option<&str>,
    ) -> Self {
        let result = apply_filters(table, &query.page_criteria(config.trigger));
        if result.is_empty() {
            log::warn!("no rows matched {:?}", query);
        }

        let selected_item = non_blank(query.itm_no.as_deref());
        let item_numbers = choices(item_number_choices(table), |v| {
            selected_item.is_some_and(|s| s == v)
        });

        let descriptions = if config.trigger.narrows_choices() && selected_item.is_some() {
            let narrowed = description_choices(table, selected_item);
            // A single matching description is picked for the user
            let only = narrowed.len() == 1;
            choices(narrowed, |v| only || query.desc.as_deref().is_some_and(|d| d == v))
        } else {
            choices(description_choices(table, None), |v| {
                query.desc.as_deref().is_some_and(|d| d == v)
            })
        };

        let classifications = Classification::ALL
            .iter()
            .map(|&column| ClassificationWidget {
                key: column.key(),
                label: widget_label(table, column),
                choices: choices(classification_choices(table, column), |v| {
                    query.classification_values(column).iter().any(|s| s == v)
                }),
            })
            .collect();

        Self {
            title: config.title.clone(),
            filter_enabled: query.filter_enabled(),
            auto_search: config.trigger.narrows_choices(),
            identifier_mode: query.mode == SearchMode::Identifier,
            item_numbers,
            descriptions,
            classifications,
            found: !result.is_empty(),
            count: result.len(),
            headers: result.headers().to_vec(),
            rows: display_rows(&result),
            export_query: raw_query.unwrap_or_default().to_string(),
        }
    }
}

fn choices(values: Vec<String>, is_selected: impl Fn(&str) -> bool) -> Vec<Choice> {
    values
        .into_iter()
        .map(|value| Choice {
            selected: is_selected(&value),
            value,
        })
        .collect()
}

// e.g. "度數 (D欄)", using where the column actually sits in the loaded file
fn widget_label(table: &RecordTable, column: Classification) -> String {
    let position = table
        .column_index(column.column())
        .and_then(|idx| u16::try_from(idx + 1).ok());
    match position {
        Some(number) => format!("{} ({}欄)", column.caption(), column_to_letter(number)),
        None => column.caption().to_string(),
    }
}

fn display_rows(result: &FilteredResult<'_>) -> Vec<Vec<String>> {
    result
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}

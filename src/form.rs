//! Search form parameters and their translation into filter criteria

use serde::Deserialize;

use crate::config::SearchTrigger;
use crate::filter::{ClassificationSelection, Criteria};
use crate::table::Classification;

/// Which group of widgets drives the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Exact item number, falling back to exact description
    #[default]
    Identifier,
    /// Multi-value selection on the classification columns
    Classification,
}

/// Query string submitted by the search page
///
/// Multi-selects arrive as repeated keys (`rating=110V&rating=220V`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Filter toggle; present (`on`) when filtering is enabled
    pub filter: Option<String>,
    #[serde(default)]
    pub mode: SearchMode,
    pub itm_no: Option<String>,
    pub desc: Option<String>,
    #[serde(default)]
    pub rating: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub size_unit: Vec<String>,
    #[serde(default)]
    pub color: Vec<String>,
    /// Set by the search button
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn filter_enabled(&self) -> bool {
        self.filter.is_some()
    }

    /// Values picked for one classification column
    pub fn classification_values(&self, column: Classification) -> &[String] {
        match column {
            Classification::Rating => &self.rating,
            Classification::Size => &self.size,
            Classification::SizeUnit => &self.size_unit,
            Classification::Color => &self.color,
        }
    }

    pub fn selection(&self) -> ClassificationSelection {
        Classification::ALL
            .iter()
            .fold(ClassificationSelection::new(), |selection, &column| {
                selection.with(column, self.classification_values(column).iter().cloned())
            })
    }

    /// Criteria for the selected mode, ignoring the toggle and the trigger
    pub fn criteria(&self) -> Criteria {
        match self.mode {
            SearchMode::Identifier => {
                Criteria::identifier(self.itm_no.as_deref(), self.desc.as_deref())
            }
            SearchMode::Classification => Criteria::Classification(self.selection()),
        }
    }

    /// Criteria for what the page shows
    ///
    /// With filtering off every row is shown. In button mode nothing is
    /// narrowed until the search button has been pressed.
    pub fn page_criteria(&self, trigger: SearchTrigger) -> Criteria {
        if !self.filter_enabled() {
            return Criteria::All;
        }
        if trigger == SearchTrigger::Button && self.search.is_none() {
            return Criteria::All;
        }
        self.criteria()
    }
}

/// Query string for the widget-choices endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsQuery {
    pub itm_no: Option<String>,
    pub desc: Option<String>,
}

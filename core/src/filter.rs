use serde::Serialize;

use crate::catalog::CatalogRecord;

/// The single active filter. Applying a new one replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterCriteria {
    #[default]
    None,
    ByCategory(String),
    ByArea(String),
    BySearchText(String),
}

impl FilterCriteria {
    fn matches<R: CatalogRecord>(&self, record: &R) -> bool {
        match self {
            FilterCriteria::None => true,
            FilterCriteria::ByCategory(label) => record.category() == Some(label.as_str()),
            FilterCriteria::ByArea(label) => record.area() == Some(label.as_str()),
            FilterCriteria::BySearchText(text) => {
                let needle = text.to_lowercase();
                let contains = |field: Option<&str>| {
                    field.is_some_and(|f| f.to_lowercase().contains(&needle))
                };
                contains(Some(record.name())) || contains(record.category()) || contains(record.area())
            }
        }
    }
}

/// Catalog snapshot plus the view produced by the active filter.
///
/// The view is computed when a filter is applied and cached until the next
/// filter call or catalog replacement.
#[derive(Debug, Clone)]
pub struct FilterEngine<R> {
    records: Vec<R>,
    criteria: FilterCriteria,
    view: Vec<usize>,
}

impl<R> Default for FilterEngine<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            criteria: FilterCriteria::None,
            view: Vec::new(),
        }
    }
}

impl<R: CatalogRecord> FilterEngine<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot. The full snapshot becomes the view; any
    /// previous filter is dropped and must be re-applied explicitly.
    pub fn set_catalog(&mut self, records: Vec<R>) {
        self.records = records;
        self.apply(FilterCriteria::None);
    }

    /// Exact, case-sensitive category match. An empty label resets.
    pub fn by_category(&mut self, label: &str) {
        self.apply(if label.is_empty() {
            FilterCriteria::None
        } else {
            FilterCriteria::ByCategory(label.to_string())
        });
    }

    /// Exact, case-sensitive area match. An empty label resets.
    pub fn by_area(&mut self, label: &str) {
        self.apply(if label.is_empty() {
            FilterCriteria::None
        } else {
            FilterCriteria::ByArea(label.to_string())
        });
    }

    /// Case-insensitive substring match on name, category or area.
    /// Empty text resets.
    pub fn by_search_text(&mut self, text: &str) {
        self.apply(if text.is_empty() {
            FilterCriteria::None
        } else {
            FilterCriteria::BySearchText(text.to_string())
        });
    }

    pub fn apply(&mut self, criteria: FilterCriteria) {
        self.view = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| criteria.matches(*r))
            .map(|(i, _)| i)
            .collect();
        self.criteria = criteria;
    }

    pub fn current_view(&self) -> impl ExactSizeIterator<Item = &R> {
        self.view.iter().map(|&i| &self.records[i])
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn view_len(&self) -> usize {
        self.view.len()
    }
}

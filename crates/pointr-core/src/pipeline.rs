// Search -> category filter -> contact filter -> sort.
//
// Each stage takes and returns borrowed rows, so the input records are never
// touched and nothing gets cloned until a caller asks for owned output.

use crate::categories::CategoryRegistry;
use crate::columns::{ColumnSet, ColumnSpec};
use crate::models::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything the user can toggle on a table view. Each part is a no-op
/// when left at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search_term: String,
    /// Category names to keep. Empty keeps everything.
    pub selected_categories: Vec<String>,
    pub contact_filters: ContactFilters,
    pub sort: SortConfig,
}

impl FilterCriteria {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_categories = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn contacts(mut self, filters: ContactFilters) -> Self {
        self.contact_filters = filters;
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = SortConfig {
            column: Some(column.into()),
            direction: Some(direction),
        };
        self
    }
}

/// Require contact details to be present. All enabled flags must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFilters {
    pub has_phone: bool,
    pub has_email: bool,
    pub has_website: bool,
}

impl ContactFilters {
    pub fn is_active(&self) -> bool {
        self.has_phone || self.has_email || self.has_website
    }

    fn matches(&self, row: &Record) -> bool {
        let present = |value: Option<&FieldValue>| value.is_some_and(|v| !v.is_blank());
        (!self.has_phone || present(row.phone()))
            && (!self.has_email || present(row.email()))
            && (!self.has_website || present(row.website()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

/// How the category filter finds a row's category
#[derive(Debug, Clone)]
pub struct CategoryFilterConfig {
    pub registry: Arc<CategoryRegistry>,
    /// Record field holding the free-text type tag
    pub type_field: String,
}

impl Default for CategoryFilterConfig {
    fn default() -> Self {
        Self {
            registry: CategoryRegistry::builtin(),
            type_field: "type".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFilterConfig {
    pub enabled: bool,
}

impl Default for ContactFilterConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Keep rows where any column's searchable text contains the term,
/// case-insensitively. Blank terms keep everything.
pub fn search_records<'a>(
    rows: Vec<&'a Record>,
    term: &str,
    columns: &ColumnSet,
) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            columns.iter().any(|col| {
                col.searchable(row)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// Keep rows whose resolved category is among `selected`
pub fn filter_by_categories<'a>(
    rows: Vec<&'a Record>,
    selected: &[String],
    config: Option<&CategoryFilterConfig>,
) -> Vec<&'a Record> {
    let Some(config) = config else {
        return rows;
    };
    if selected.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            let category = config
                .registry
                .category_for(row.get_str(&config.type_field));
            selected.iter().any(|name| *name == category.name)
        })
        .collect()
}

/// Keep rows that carry every requested kind of contact detail
pub fn filter_by_contact_info<'a>(
    rows: Vec<&'a Record>,
    filters: &ContactFilters,
    config: &ContactFilterConfig,
) -> Vec<&'a Record> {
    if !config.enabled || !filters.is_active() {
        return rows;
    }

    rows.into_iter().filter(|row| filters.matches(row)).collect()
}

/// Stable sort by one column. Nulls always go last; an unknown column or a
/// missing direction leaves the order untouched.
pub fn sort_records<'a>(
    rows: Vec<&'a Record>,
    sort: &SortConfig,
    columns: &ColumnSet,
) -> Vec<&'a Record> {
    let (Some(column_id), Some(direction)) = (sort.column.as_deref(), sort.direction) else {
        return rows;
    };

    let Some(column) = columns.get(column_id) else {
        warn!("Ignoring sort on unknown column '{}'", column_id);
        return rows;
    };

    let mut keyed: Vec<(Option<SortKey>, &'a Record)> = rows
        .into_iter()
        .map(|row| (SortKey::for_row(column, row), row))
        .collect();

    // sort_by is stable, so equal keys keep their input order in both directions
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), direction));

    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Comparable form of a cell
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl SortKey {
    fn for_row(column: &ColumnSpec, row: &Record) -> Option<SortKey> {
        let value = row.get(&column.id)?;
        if let Some(format) = &column.format {
            return Some(SortKey::Text(format(value, row).to_lowercase()));
        }
        match value {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(SortKey::Bool(*b)),
            FieldValue::Number(n) => n.as_f64().map(SortKey::Number),
            FieldValue::Text(s) => Some(SortKey::Text(s.to_lowercase())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Bool(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn cmp_native(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = a.cmp_native(b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// The full table pipeline with its columns and lookup config bound once
#[derive(Debug, Clone)]
pub struct RecordPipeline {
    columns: ColumnSet,
    categories: Option<CategoryFilterConfig>,
    contacts: ContactFilterConfig,
}

impl RecordPipeline {
    /// Pipeline over the built-in categories with contact filtering enabled
    pub fn new(columns: ColumnSet) -> Self {
        Self {
            columns,
            categories: Some(CategoryFilterConfig::default()),
            contacts: ContactFilterConfig::default(),
        }
    }

    /// Replace the category lookup, or pass `None` to disable the stage
    pub fn with_categories(mut self, config: Option<CategoryFilterConfig>) -> Self {
        self.categories = config;
        self
    }

    pub fn with_contact_filter(mut self, config: ContactFilterConfig) -> Self {
        self.contacts = config;
        self
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn category_config(&self) -> Option<&CategoryFilterConfig> {
        self.categories.as_ref()
    }

    /// Visible rows, borrowed from `records`, in display order
    pub fn view<'a>(&self, records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
        let rows: Vec<&Record> = records.iter().collect();
        let total = rows.len();

        let rows = search_records(rows, &criteria.search_term, &self.columns);
        debug!("search '{}': {} of {} rows", criteria.search_term, rows.len(), total);

        let rows = filter_by_categories(
            rows,
            &criteria.selected_categories,
            self.categories.as_ref(),
        );
        debug!("category filter: {} rows", rows.len());

        let rows = filter_by_contact_info(rows, &criteria.contact_filters, &self.contacts);
        debug!("contact filter: {} rows", rows.len());

        sort_records(rows, &criteria.sort, &self.columns)
    }

    /// Same as [`view`](Self::view) but returns owned copies
    pub fn apply(&self, records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
        self.view(records, criteria).into_iter().cloned().collect()
    }
}

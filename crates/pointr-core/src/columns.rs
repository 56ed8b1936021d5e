use crate::error::ColumnIssue;
use crate::models::{FieldValue, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Turns a cell value into text. Gets the whole row too, for columns that
/// derive their display from more than one field.
pub type CellFn = Arc<dyn Fn(&FieldValue, &Record) -> String + Send + Sync>;

/// One table column: which field it reads and how to show it
#[derive(Clone)]
pub struct ColumnSpec {
    pub id: String,
    pub header: String,
    /// Used for display, search matching and sort keys
    pub format: Option<CellFn>,
    /// Display only, takes precedence over `format` when rendering
    pub render: Option<CellFn>,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            format: None,
            render: None,
        }
    }

    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&FieldValue, &Record) -> String + Send + Sync + 'static,
    {
        self.format = Some(Arc::new(format));
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&FieldValue, &Record) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Text the search stage matches against. `None` for null/absent cells.
    pub fn searchable(&self, row: &Record) -> Option<String> {
        let value = row.get(&self.id)?;
        Some(match &self.format {
            Some(format) => format(value, row),
            None => value.to_string(),
        })
    }

    /// Text shown in the table cell
    pub fn display(&self, row: &Record) -> String {
        let Some(value) = row.get(&self.id) else {
            return String::new();
        };
        match (&self.render, &self.format) {
            (Some(render), _) => render(value, row),
            (None, Some(format)) => format(value, row),
            (None, None) => value.to_string(),
        }
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("format", &self.format.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Column declaration as it appears in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    pub header: String,
}

impl From<&ColumnConfig> for ColumnSpec {
    fn from(config: &ColumnConfig) -> Self {
        ColumnSpec::new(config.id.clone(), config.header.clone())
    }
}

/// A validated, non-empty column list with unique ids
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<ColumnSpec>,
}

impl ColumnSet {
    /// Validate up front. Every issue is reported, not just the first one.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        let issues = validate_columns(&columns);
        if issues.is_empty() {
            Ok(Self { columns })
        } else {
            Err(Error::InvalidColumns(issues))
        }
    }

    pub fn from_config(configs: &[ColumnConfig]) -> Result<Self> {
        Self::new(configs.iter().map(ColumnSpec::from).collect())
    }

    pub fn get(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.columns.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a constructed set, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Check a column list, returning every problem found
pub fn validate_columns(columns: &[ColumnSpec]) -> Vec<ColumnIssue> {
    if columns.is_empty() {
        return vec![ColumnIssue::Empty];
    }

    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, column) in columns.iter().enumerate() {
        if column.id.trim().is_empty() {
            issues.push(ColumnIssue::MissingId { index });
            continue;
        }
        if column.header.trim().is_empty() {
            issues.push(ColumnIssue::MissingHeader {
                id: column.id.clone(),
            });
        }
        if !seen.insert(column.id.as_str()) {
            issues.push(ColumnIssue::DuplicateId {
                id: column.id.clone(),
            });
        }
    }

    issues
}

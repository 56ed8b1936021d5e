use thiserror::Error;

/// All the ways setup and export can go wrong in Pointr
///
/// Data variability (null fields, unknown tags, unknown sort columns) never
/// ends up here. Those have well-defined fallbacks in the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid column configuration: {}", format_issues(.0))]
    InvalidColumns(Vec<ColumnIssue>),

    #[error("Invalid category registry: {0}")]
    InvalidCategories(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Record source failed: {0}")]
    SourceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A single problem found while validating a column list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnIssue {
    /// The column list itself is empty
    Empty,
    /// Column at this position has a blank id
    MissingId { index: usize },
    /// Column with this id has a blank header
    MissingHeader { id: String },
    /// Two columns share the same id
    DuplicateId { id: String },
}

impl std::fmt::Display for ColumnIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnIssue::Empty => write!(f, "columns must be a non-empty list"),
            ColumnIssue::MissingId { index } => {
                write!(f, "column at index {} missing required 'id'", index)
            }
            ColumnIssue::MissingHeader { id } => {
                write!(f, "column '{}' missing required 'header'", id)
            }
            ColumnIssue::DuplicateId { id } => write!(f, "column id '{}' declared twice", id),
        }
    }
}

fn format_issues(issues: &[ColumnIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

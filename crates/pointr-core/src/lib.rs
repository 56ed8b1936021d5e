// Core of Pointr: categories, colors and the table pipeline that the map,
// the legend and exports all share

pub mod categories;
pub mod color;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod palette;
pub mod pipeline;
pub mod source;
pub mod table;

pub use categories::{Category, CategoryRegistry, MatchTable};
pub use color::{Color, HuePalette};
pub use columns::{ColumnSet, ColumnSpec};
pub use config::Config;
pub use error::{ColumnIssue, Error};
pub use export::{ExportFormat, ExportPayload, Exporter};
pub use models::{FieldValue, Record};
pub use palette::SourcePalette;
pub use pipeline::{
    ContactFilterConfig, ContactFilters, FilterCriteria, RecordPipeline, SortConfig,
    SortDirection,
};
pub use source::{JsonFileSource, RecordSource};
pub use table::DataTable;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;

use crate::columns::ColumnSet;
use crate::models::{FieldValue, Record};
use crate::{Error, Result};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json;charset=utf-8",
        }
    }

    /// `export.csv`, `export.json`
    pub fn default_filename(&self) -> String {
        format!("export.{}", self.extension())
    }
}

/// Serialized export ready to hand to whatever delivers the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.bytes).map_err(|e| {
            Error::ExportError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

/// Turns the visible rows of a table into CSV or JSON
///
/// Output only ever contains the given columns, in column order. Extra
/// fields the records carry stay out of the file.
pub struct Exporter;

impl Exporter {
    /// Build a payload, or `None` when there's nothing to export
    pub fn export<R: AsRef<Record>>(
        records: &[R],
        columns: &ColumnSet,
        format: ExportFormat,
        filename: Option<&str>,
    ) -> Result<Option<ExportPayload>> {
        if records.is_empty() {
            warn!("No data to export");
            return Ok(None);
        }

        let bytes = match format {
            ExportFormat::Csv => Self::to_csv(records, columns)?,
            ExportFormat::Json => Self::to_json(records, columns)?,
        };

        Ok(Some(ExportPayload {
            format,
            filename: filename
                .map(str::to_string)
                .unwrap_or_else(|| format.default_filename()),
            bytes,
        }))
    }

    /// Export to a file, picking the format from its extension.
    /// Returns `false` without touching the filesystem when `records` is empty.
    pub fn export_to_file<R: AsRef<Record>, P: AsRef<Path>>(
        records: &[R],
        columns: &ColumnSet,
        path: P,
    ) -> Result<bool> {
        let path = path.as_ref();
        let format = ExportFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(
                "Could not determine export format from extension. Use .csv or .json".to_string(),
            )
        })?;

        let filename = path.file_name().and_then(|n| n.to_str());
        match Self::export(records, columns, format, filename)? {
            Some(payload) => {
                payload.write_to(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Quoted header row, then one fully quoted row per record, joined by `\n`
    pub fn to_csv<R: AsRef<Record>>(records: &[R], columns: &ColumnSet) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(columns.headers())
            .map_err(|e| Error::ExportError(format!("Failed to write CSV header: {}", e)))?;

        for record in records {
            let record: &Record = record.as_ref();
            let row = columns
                .iter()
                .map(|col| record.get(&col.id).map(ToString::to_string).unwrap_or_default());
            writer
                .write_record(row)
                .map_err(|e| Error::ExportError(format!("Failed to write CSV row: {}", e)))?;
        }

        let mut bytes = writer
            .into_inner()
            .map_err(|e| Error::ExportError(format!("Failed to flush CSV: {}", e)))?;

        // rows are joined, not terminated
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(bytes)
    }

    /// Array of objects holding exactly the column fields, two-space indent
    pub fn to_json<R: AsRef<Record>>(records: &[R], columns: &ColumnSet) -> Result<Vec<u8>> {
        let projected = Projection { records, columns };
        serde_json::to_vec_pretty(&projected)
            .map_err(|e| Error::ExportError(format!("Failed to serialize JSON: {}", e)))
    }
}

struct Projection<'a, R> {
    records: &'a [R],
    columns: &'a ColumnSet,
}

struct ProjectedRow<'a> {
    record: &'a Record,
    columns: &'a ColumnSet,
}

impl<R: AsRef<Record>> Serialize for Projection<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in self.records {
            seq.serialize_element(&ProjectedRow {
                record: record.as_ref(),
                columns: self.columns,
            })?;
        }
        seq.end()
    }
}

impl Serialize for ProjectedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for col in self.columns {
            let value = self.record.get(&col.id).unwrap_or(&FieldValue::Null);
            map.serialize_entry(&col.id, value)?;
        }
        map.end()
    }
}

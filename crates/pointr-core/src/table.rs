use crate::export::{ExportFormat, ExportPayload, Exporter};
use crate::models::Record;
use crate::pipeline::{FilterCriteria, RecordPipeline};
use crate::source::RecordSource;
use crate::Result;
use tracing::debug;

/// Loaded records plus the pipeline that decides what's visible
///
/// Exports always go through the same view the user is looking at, so a
/// filtered table never exports hidden rows or hidden columns.
#[derive(Debug, Clone)]
pub struct DataTable {
    records: Vec<Record>,
    pipeline: RecordPipeline,
}

impl DataTable {
    pub fn new(records: Vec<Record>, pipeline: RecordPipeline) -> Self {
        Self { records, pipeline }
    }

    pub fn load(source: &dyn RecordSource, pipeline: RecordPipeline) -> Result<Self> {
        let records = source.load()?;
        debug!("Table loaded with {} records", records.len());
        Ok(Self::new(records, pipeline))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn pipeline(&self) -> &RecordPipeline {
        &self.pipeline
    }

    pub fn view(&self, criteria: &FilterCriteria) -> Vec<&Record> {
        self.pipeline.view(&self.records, criteria)
    }

    /// Rendered cell text for the visible rows, in column order
    pub fn rows(&self, criteria: &FilterCriteria) -> Vec<Vec<String>> {
        let columns = self.pipeline.columns();
        self.view(criteria)
            .into_iter()
            .map(|row| columns.iter().map(|col| col.display(row)).collect())
            .collect()
    }

    pub fn export(
        &self,
        criteria: &FilterCriteria,
        format: ExportFormat,
        filename: Option<&str>,
    ) -> Result<Option<ExportPayload>> {
        let visible = self.view(criteria);
        Exporter::export(&visible, self.pipeline.columns(), format, filename)
    }
}

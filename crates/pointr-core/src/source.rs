use crate::models::Record;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that can hand over a batch of records
///
/// The table doesn't care whether records came from the geo service, a
/// saved session or a file on disk. Keeping this a trait also makes the
/// table easy to drive from a mock in tests.
#[cfg_attr(test, mockall::automock)]
pub trait RecordSource {
    fn load(&self) -> Result<Vec<Record>>;
}

/// Reads a JSON array of flat objects
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Record>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::SourceError(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let records: Vec<Record> = serde_json::from_str(&contents)?;
        info!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Kiosk", "type": "convenience", "phone": "555"}}, {{"name": "Depot", "type": "post_depot"}}]"#
        )
        .unwrap();

        let records = JsonFileSource::new(file.path()).load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get_str("phone"), Some("555"));
        assert_eq!(records[1].type_tag(), Some("post_depot"));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = JsonFileSource::new("/definitely/not/here.json")
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::SourceError(_)));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = JsonFileSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}

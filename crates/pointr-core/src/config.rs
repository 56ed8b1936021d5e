use crate::columns::{ColumnConfig, ColumnSet};
use crate::export::ExportFormat;
use crate::pipeline::{CategoryFilterConfig, ContactFilterConfig, RecordPipeline};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `<config dir>/pointr/config.toml` when present, defaults
/// otherwise. CLI flags override whatever ends up in here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load config from default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load from an explicit path. A missing file means defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(Self::config_path()?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Uses XDG on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("pointr");

        Ok(config_dir.join("config.toml"))
    }

    /// Build the table pipeline this config describes. Bad column entries
    /// fail here, before any data is touched.
    pub fn pipeline(&self) -> crate::Result<RecordPipeline> {
        let columns = ColumnSet::from_config(&self.table.columns)?;
        Ok(RecordPipeline::new(columns)
            .with_categories(Some(CategoryFilterConfig {
                type_field: self.table.type_field.clone(),
                ..CategoryFilterConfig::default()
            }))
            .with_contact_filter(ContactFilterConfig {
                enabled: self.table.contact_filter_enabled,
            }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableConfig {
    /// Columns shown in the table, in order
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnConfig>,

    /// Record field carrying the business type tag
    #[serde(default = "default_type_field")]
    pub type_field: String,

    /// Offer the has-phone / has-email / has-website filters
    #[serde(default = "default_true")]
    pub contact_filter_enabled: bool,
}

fn default_columns() -> Vec<ColumnConfig> {
    [
        ("name", "Name"),
        ("type", "Type"),
        ("address", "Address"),
        ("phone", "Phone"),
        ("email", "Email"),
        ("website", "Website"),
        ("source", "Source"),
    ]
    .into_iter()
    .map(|(id, header)| ColumnConfig {
        id: id.to_string(),
        header: header.to_string(),
    })
    .collect()
}

fn default_type_field() -> String {
    "type".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            type_field: default_type_field(),
            contact_filter_enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// File stem used when no explicit export path is given
    #[serde(default = "default_filename")]
    pub default_filename: String,

    /// "csv" or "json"
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_filename() -> String {
    "export".to_string()
}

fn default_format() -> String {
    "csv".to_string()
}

impl ExportConfig {
    pub fn format(&self) -> crate::Result<ExportFormat> {
        ExportFormat::from_extension(&self.default_format).ok_or_else(|| {
            crate::Error::ConfigError(format!(
                "Unknown export format '{}', expected csv or json",
                self.default_format
            ))
        })
    }

    /// e.g. `export.csv`
    pub fn filename(&self) -> crate::Result<String> {
        Ok(format!("{}.{}", self.default_filename, self.format()?.extension()))
    }

    /// Where an export should land. No target means the configured filename
    /// in the working directory; a directory target gets it appended.
    pub fn resolve_path(&self, target: Option<&Path>) -> crate::Result<PathBuf> {
        match target {
            Some(path) if !path.is_dir() => Ok(path.to_path_buf()),
            Some(dir) => Ok(dir.join(self.filename()?)),
            None => Ok(PathBuf::from(self.filename()?)),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: default_filename(),
            default_format: default_format(),
        }
    }
}

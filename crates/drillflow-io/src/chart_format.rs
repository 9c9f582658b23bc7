//! On-disk chart file format.
//!
//! A saved chart is wrapped in a [`ChartFile`] container that adds a format
//! version and save timestamps. Files serialize to RON (the native `.drill`
//! extension) or JSON, chosen by file extension.

use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use drillflow_core::DrillChart;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// The current version of the chart file format.
///
/// Stamped into saved files; bump on breaking changes to [`ChartFile`] or
/// the chart model it embeds.
pub const CHART_FILE_VERSION: &str = "1.0.0";

/// Maximum allowed chart file size (10 MB).
///
/// Guards against unbounded memory use when loading untrusted files.
pub const MAX_CHART_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Top-level structure of a saved chart file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartFile {
    /// Format version.
    pub version: String,
    /// Save metadata.
    pub metadata: ChartFileMetadata,
    /// The chart itself.
    pub chart: DrillChart,
}

/// Metadata stamped into a chart file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartFileMetadata {
    /// When the file was first created.
    pub created_at: DateTime<Utc>,
    /// When the file was last written.
    pub modified_at: DateTime<Utc>,
}

impl ChartFile {
    /// Wrap a chart for saving, stamping creation and modification times.
    pub fn new(chart: DrillChart) -> Self {
        let now = Utc::now();
        Self {
            version: CHART_FILE_VERSION.to_string(),
            metadata: ChartFileMetadata {
                created_at: now,
                modified_at: now,
            },
            chart,
        }
    }

    /// Load a chart file from disk, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_limit(path, MAX_CHART_FILE_SIZE)
    }

    fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(IoError::FileTooLarge { size, limit });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("drill");

        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;

        match extension {
            "json" => Ok(serde_json::from_str(&content)?),
            "ron" | "drill" => Ok(ron::from_str(&content)?),
            _ => Err(IoError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Save to disk, dispatching on the file extension and refreshing the
    /// modification timestamp.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("drill");

        self.metadata.modified_at = Utc::now();

        match extension {
            "json" => {
                let file = File::create(path)?;
                serde_json::to_writer_pretty(file, self)?;
            }
            "ron" | "drill" => {
                let config = ron::ser::PrettyConfig::default();
                let s = ron::ser::to_string_pretty(self, config)?;
                let mut file = File::create(path)?;
                file.write_all(s.as_bytes())?;
            }
            _ => return Err(IoError::UnsupportedFormat(extension.to_string())),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_chart() -> DrillChart {
        let mut chart = DrillChart::new("Halftime", "song_001");
        chart
            .formations
            .push(drillflow_core::Formation::new(0.0, 8.0, "Opening"));
        chart
    }

    #[test]
    fn chart_file_ron_roundtrip() {
        let mut chart_file = ChartFile::new(sample_chart());
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("drill");

        chart_file.save(&path).unwrap();
        let loaded = ChartFile::load(&path).unwrap();

        assert_eq!(chart_file.version, loaded.version);
        assert_eq!(chart_file.chart, loaded.chart);
    }

    #[test]
    fn chart_file_json_roundtrip() {
        let mut chart_file = ChartFile::new(sample_chart());
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("json");

        chart_file.save(&path).unwrap();
        let loaded = ChartFile::load(&path).unwrap();

        assert_eq!(chart_file.chart, loaded.chart);
    }

    #[test]
    fn test_unsupported_extension() {
        let mut chart_file = ChartFile::new(sample_chart());
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("txt");

        let result = chart_file.save(&path);
        assert!(matches!(result, Err(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_file_too_large() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("drill");
        std::fs::write(&path, vec![b' '; 1024]).unwrap();

        let result = ChartFile::load_with_limit(&path, 500);
        assert!(matches!(result, Err(IoError::FileTooLarge { .. })));
    }

    #[test]
    fn test_modified_at_updates_on_save() {
        let mut chart_file = ChartFile::new(sample_chart());
        let first = chart_file.metadata.modified_at;

        std::thread::sleep(std::time::Duration::from_millis(10));

        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("drill");
        chart_file.save(&path).unwrap();

        assert!(chart_file.metadata.modified_at > first);
    }
}

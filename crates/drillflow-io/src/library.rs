//! Chart library - directory-backed chart persistence.
//!
//! Charts are stored one file per chart under a root directory, named by
//! chart id. The library hands out lightweight summaries for browse
//! screens and loads full charts on demand; the storage format is the
//! [`ChartFile`](crate::chart_format::ChartFile) container.

use crate::chart_format::{ChartFile, CHART_FILE_VERSION};
use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use drillflow_core::{ChartId, DrillChart};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Lightweight listing entry for a saved chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    /// Chart id (also the file stem).
    pub id: ChartId,
    /// Chart name.
    pub name: String,
    /// Referenced song id.
    pub song_id: String,
    /// Number of formations.
    pub formation_count: usize,
    /// When the file was last written.
    pub last_modified: DateTime<Utc>,
}

/// A directory of saved charts.
#[derive(Debug, Clone)]
pub struct ChartLibrary {
    root: PathBuf,
}

impl ChartLibrary {
    /// Open (creating if needed) a library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The library's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chart_path(&self, id: ChartId) -> PathBuf {
        self.root.join(format!("{id}.drill"))
    }

    /// Save a chart, overwriting any previous save with the same id.
    /// Returns the path written.
    pub fn save_chart(&self, chart: &DrillChart) -> Result<PathBuf> {
        let path = self.chart_path(chart.id);
        let mut file = ChartFile::new(chart.clone());
        file.save(&path)?;
        Ok(path)
    }

    /// Load a chart by id.
    pub fn load_chart(&self, id: ChartId) -> Result<DrillChart> {
        let path = self.chart_path(id);
        if !path.exists() {
            return Err(IoError::ChartNotFound(id));
        }

        let file = ChartFile::load(&path)?;
        if file.version != CHART_FILE_VERSION {
            return Err(IoError::VersionMismatch {
                expected: CHART_FILE_VERSION.to_string(),
                found: file.version,
            });
        }
        Ok(file.chart)
    }

    /// Delete a saved chart by id.
    pub fn delete_chart(&self, id: ChartId) -> Result<()> {
        let path = self.chart_path(id);
        if !path.exists() {
            return Err(IoError::ChartNotFound(id));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// Summaries of every chart in the library. Unreadable files are
    /// logged and skipped rather than failing the whole listing.
    pub fn list_charts(&self) -> Vec<ChartSummary> {
        let mut summaries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let is_chart = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "drill");
            if !is_chart {
                continue;
            }

            match ChartFile::load(path) {
                Ok(file) => summaries.push(ChartSummary {
                    id: file.chart.id,
                    name: file.chart.name.clone(),
                    song_id: file.chart.song_id.clone(),
                    formation_count: file.chart.formations.len(),
                    last_modified: file.metadata.modified_at,
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable chart file");
                }
            }
        }

        summaries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        summaries
    }
}

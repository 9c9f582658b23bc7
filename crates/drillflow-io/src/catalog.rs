//! Local content catalog.
//!
//! Reads song metadata and formation templates from a content directory
//! (`songs/` and `templates/` subdirectories, RON or JSON files) and serves
//! them through the core [`ContentCatalog`] trait. Entries are cached at
//! open time; the catalog is read-only afterwards.

use crate::error::Result;
use drillflow_core::{ContentCatalog, FormationTemplate, SongMeta};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory-backed implementation of [`ContentCatalog`].
#[derive(Debug, Default)]
pub struct LocalContentCatalog {
    songs: HashMap<String, SongMeta>,
    templates: HashMap<String, FormationTemplate>,
}

fn parse_entry<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let extension = path.extension().and_then(|ext| ext.to_str())?;
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read catalog entry");
            return None;
        }
    };

    let parsed = match extension {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        "ron" => ron::from_str(&content).map_err(|e| e.to_string()),
        _ => return None,
    };

    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping malformed catalog entry");
            None
        }
    }
}

fn scan_dir<T: DeserializeOwned>(dir: &Path) -> Vec<T> {
    if !dir.exists() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| parse_entry(e.path()))
        .collect()
}

impl LocalContentCatalog {
    /// Create an empty catalog. Entries can be inserted programmatically.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a content directory and cache everything found.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut catalog = Self::default();

        for song in scan_dir::<SongMeta>(&root.join("songs")) {
            catalog.songs.insert(song.id.clone(), song);
        }
        for template in scan_dir::<FormationTemplate>(&root.join("templates")) {
            catalog.templates.insert(template.id.clone(), template);
        }

        debug!(
            songs = catalog.songs.len(),
            templates = catalog.templates.len(),
            "content catalog loaded"
        );
        Ok(catalog)
    }

    /// Register a song directly (used by tests and built-in content).
    pub fn insert_song(&mut self, song: SongMeta) {
        self.songs.insert(song.id.clone(), song);
    }

    /// Register a template directly.
    pub fn insert_template(&mut self, template: FormationTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Number of cached songs.
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Number of cached templates.
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

impl ContentCatalog for LocalContentCatalog {
    fn song(&self, id: &str) -> Option<SongMeta> {
        self.songs.get(id).cloned()
    }

    fn template(&self, id: &str) -> Option<FormationTemplate> {
        self.templates.get(id).cloned()
    }
}

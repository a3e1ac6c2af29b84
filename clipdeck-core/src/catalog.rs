//! The media catalog: every imported file and its enrichment state.
//!
//! The catalog is plain data. Sharing it between the pipeline and its
//! consumers is done by wrapping it in `Arc<Mutex<_>>` at the composition
//! root. Updates addressed to an id that is no longer present are no-ops, so a
//! file removed while its enrichment is in flight stays removed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::{VideoMetadata, mime_type_for};

/// Identifier assigned to a media file at import time.
pub type MediaId = String;

/// Where a file is in the enrichment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingState {
    /// Recorded but not yet queued for enrichment.
    Pending,
    Processing,
    /// Full metadata extracted.
    Ready,
    /// Only basic metadata available.
    Degraded,
    /// A critical error made the file unusable.
    Failed,
}

impl ProcessingState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Degraded | Self::Failed)
    }
}

/// One imported media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: MediaId,
    /// Display name (the file name).
    pub name: String,
    pub path: PathBuf,
    /// Bytes.
    pub size: u64,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    /// Seconds; `None` until metadata is known.
    pub duration: Option<f64>,
    /// `WxH` or `"Unknown"`.
    pub resolution: Option<String>,
    pub codec: Option<String>,
    pub thumbnail_path: Option<PathBuf>,
    pub thumbnail_error: Option<String>,
    pub processing_state: ProcessingState,
    /// Message of the critical error that failed the file.
    pub error: Option<String>,
    pub is_basic_metadata: bool,
    pub metadata_error: Option<String>,
    /// Files this one was trimmed or concatenated from; empty for imports.
    #[serde(default)]
    pub source_ids: Vec<MediaId>,
}

impl MediaFile {
    pub fn new(
        id: impl Into<MediaId>,
        path: &Path,
        size: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            id: id.into(),
            name,
            path: path.to_path_buf(),
            size,
            mime_type: mime_type_for(path).to_string(),
            last_modified,
            duration: None,
            resolution: None,
            codec: None,
            thumbnail_path: None,
            thumbnail_error: None,
            processing_state: ProcessingState::Pending,
            error: None,
            is_basic_metadata: false,
            metadata_error: None,
            source_ids: Vec::new(),
        }
    }

    /// Copies extracted metadata onto the record. The processing state is
    /// left to the caller.
    pub fn apply_metadata(&mut self, metadata: &VideoMetadata) {
        self.duration = Some(metadata.duration);
        self.resolution = Some(metadata.resolution());
        self.codec = Some(metadata.video.codec.clone());
        if metadata.size > 0 {
            self.size = metadata.size;
        }
        self.is_basic_metadata = metadata.is_basic_metadata;
        self.metadata_error = metadata.metadata_error.clone();
    }
}

/// Ordered collection of media files, in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaCatalog {
    files: Vec<MediaFile>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, replacing any existing record with the same id.
    pub fn insert(&mut self, file: MediaFile) {
        match self.files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MediaFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn list(&self) -> &[MediaFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Applies `patch` to the file with `id`. Returns `false`, without
    /// creating anything, when no such file exists.
    pub fn update(&mut self, id: &str, patch: impl FnOnce(&mut MediaFile)) -> bool {
        match self.files.iter_mut().find(|f| f.id == id) {
            Some(file) => {
                patch(file);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<MediaFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Files whose enrichment has not finished.
    pub fn in_flight(&self) -> impl Iterator<Item = &MediaFile> {
        self.files
            .iter()
            .filter(|f| !f.processing_state.is_terminal())
    }
}

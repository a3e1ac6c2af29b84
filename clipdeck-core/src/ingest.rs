// ============================================================================
// clipdeck-core/src/ingest.rs
// ============================================================================
//
// INGESTION PIPELINE: Import, then enrich one file at a time
//
// `import` creates catalog records synchronously (all `Processing`) and
// returns their ids. `enrich` then walks the ids sequentially: probe with
// fallback, then thumbnail with fallback, each stage written back to the
// catalog under a short lock. A failure only ever affects its own file.
//
// Trimming and concatenation write a new file to the temp directory and
// register it as a derived record that goes through the same enrichment.
//
// KEY CONCEPTS:
// - Critical errors (missing, empty, permission) end in `Failed`
// - Any other metadata failure ends in `Degraded` with basic metadata
// - Thumbnail failures set `thumbnail_error` and nothing else
// - A record removed mid-enrichment stays removed; its updates are dropped
//
// AI-ASSISTANT-INFO: Sequential enrichment pipeline over a shared catalog

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::availability::AvailabilityMonitor;
use crate::catalog::{MediaCatalog, MediaFile, MediaId, ProcessingState};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, fs_error};
use crate::external::MediaTool;
use crate::media::probe::BASIC_METADATA_NOTE;
use crate::media::{
    DEFAULT_CONCAT_FILE_NAME, EncodeSettings, MediaEditor, MediaProbe, ThumbnailGenerator,
    ThumbnailOptions, VideoMetadata, VideoStreamInfo, is_supported_format, thumbnail_path_for,
};
use crate::utils::generate_id;

/// A file offered for import, with its filesystem stat.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl ImportRequest {
    /// Stats `path`. Fails when the path is missing, unreadable or not a file.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| fs_error(path, e))?;
        if !metadata.is_file() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            last_modified,
        })
    }
}

/// Result of an import batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Ids of the created records, in input order.
    pub accepted: Vec<MediaId>,
    pub rejected: Vec<(PathBuf, CoreError)>,
}

/// Terminal outcome of enriching one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Ready,
    Degraded,
    Failed,
    /// The record was gone before or during enrichment.
    Skipped,
}

/// Counts of outcomes over one `enrich` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub ready: usize,
    pub degraded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl EnrichmentSummary {
    fn record(&mut self, outcome: EnrichmentOutcome) {
        match outcome {
            EnrichmentOutcome::Ready => self.ready += 1,
            EnrichmentOutcome::Degraded => self.degraded += 1,
            EnrichmentOutcome::Failed => self.failed += 1,
            EnrichmentOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ready + self.degraded + self.failed + self.skipped
    }
}

/// Orchestrates probing and thumbnailing for imported files.
pub struct IngestionPipeline {
    catalog: Arc<Mutex<MediaCatalog>>,
    probe: MediaProbe,
    thumbnails: ThumbnailGenerator,
    editor: MediaEditor,
    thumbnail_dir: PathBuf,
    thumbnail_options: ThumbnailOptions,
}

impl IngestionPipeline {
    pub fn new(
        catalog: Arc<Mutex<MediaCatalog>>,
        probe: MediaProbe,
        thumbnails: ThumbnailGenerator,
        editor: MediaEditor,
        config: &CoreConfig,
    ) -> Self {
        Self {
            catalog,
            probe,
            thumbnails,
            editor,
            thumbnail_dir: config.thumbnail_dir(),
            thumbnail_options: config.thumbnail.clone(),
        }
    }

    /// Builds the probe, thumbnail generator and editor over a shared tool
    /// and monitor.
    pub fn with_tool(
        config: &CoreConfig,
        tool: Arc<dyn MediaTool>,
        monitor: Arc<AvailabilityMonitor>,
        catalog: Arc<Mutex<MediaCatalog>>,
    ) -> Self {
        let probe = MediaProbe::new(Arc::clone(&tool), Arc::clone(&monitor), config);
        let thumbnails = ThumbnailGenerator::new(Arc::clone(&tool), Arc::clone(&monitor), config);
        let editor = MediaEditor::new(tool, monitor, config);
        Self::new(catalog, probe, thumbnails, editor, config)
    }

    pub fn catalog(&self) -> &Arc<Mutex<MediaCatalog>> {
        &self.catalog
    }

    /// Stats and records each path. Paths that cannot be stat'ed or have an
    /// unsupported extension are rejected; the rest are accepted.
    pub fn import(&self, paths: &[PathBuf]) -> ImportReport {
        let mut report = ImportReport::default();
        let mut requests = Vec::with_capacity(paths.len());

        for path in paths {
            match ImportRequest::from_path(path) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    warn!("Cannot import {}: {}", path.display(), e);
                    report.rejected.push((path.clone(), e));
                }
            }
        }

        let from_requests = self.import_requests(requests);
        report.accepted = from_requests.accepted;
        report.rejected.extend(from_requests.rejected);
        report
    }

    /// Records already-stat'ed files as `Processing` and returns their ids.
    pub fn import_requests(&self, requests: Vec<ImportRequest>) -> ImportReport {
        let mut report = ImportReport::default();

        for request in requests {
            if !is_supported_format(&request.path) {
                let ext = request
                    .path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!("Unsupported video format: {}", request.path.display());
                report
                    .rejected
                    .push((request.path, CoreError::UnsupportedFormat(ext)));
                continue;
            }

            let id = generate_id("media");
            let mut file = MediaFile::new(id.clone(), &request.path, request.size, request.last_modified);
            file.processing_state = ProcessingState::Processing;
            self.lock_catalog().insert(file);

            debug!("Imported {} as {}", request.path.display(), id);
            report.accepted.push(id);
        }

        info!(
            "Import batch: {} accepted, {} rejected",
            report.accepted.len(),
            report.rejected.len()
        );
        report
    }

    /// Enriches `ids` one after another.
    pub fn enrich(&self, ids: &[MediaId]) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();
        for (index, id) in ids.iter().enumerate() {
            debug!("Enriching file {}/{}: {}", index + 1, ids.len(), id);
            summary.record(self.enrich_file(id));
        }
        info!(
            "Enrichment finished: {} ready, {} degraded, {} failed, {} skipped",
            summary.ready, summary.degraded, summary.failed, summary.skipped
        );
        summary
    }

    /// Runs `enrich` on one background thread.
    pub fn spawn_enrichment(self: &Arc<Self>, ids: Vec<MediaId>) -> JoinHandle<EnrichmentSummary> {
        let pipeline = Arc::clone(self);
        thread::spawn(move || pipeline.enrich(&ids))
    }

    /// Probe, then thumbnail, for one file.
    pub fn enrich_file(&self, id: &str) -> EnrichmentOutcome {
        let path = {
            let mut catalog = self.lock_catalog();
            let Some(file) = catalog.get(id) else {
                debug!("Skipping {}: no longer in the catalog", id);
                return EnrichmentOutcome::Skipped;
            };
            let path = file.path.clone();
            catalog.update(id, |f| f.processing_state = ProcessingState::Processing);
            path
        };

        // ---- Metadata ----
        let metadata = match self.probe.probe_with_fallback(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.is_critical() => {
                error!("Failed to process {}: {}", path.display(), e);
                let message = e.to_string();
                let updated = self.lock_catalog().update(id, |f| {
                    f.processing_state = ProcessingState::Failed;
                    f.error = Some(message);
                });
                return if updated {
                    EnrichmentOutcome::Failed
                } else {
                    EnrichmentOutcome::Skipped
                };
            }
            Err(e) => {
                warn!("Metadata unavailable for {}: {}", path.display(), e);
                degraded_metadata(&e)
            }
        };

        let degraded = metadata.is_basic_metadata;
        if !self.lock_catalog().update(id, |f| f.apply_metadata(&metadata)) {
            debug!("{} was removed during probing; dropping metadata", id);
            return EnrichmentOutcome::Skipped;
        }

        // ---- Thumbnail ----
        let output = thumbnail_path_for(&self.thumbnail_dir, id);
        let thumbnail = self
            .thumbnails
            .generate_with_fallback(&path, &output, &self.thumbnail_options);
        if let Err(e) = &thumbnail {
            warn!("No thumbnail for {}: {}", path.display(), e);
        }

        let state = if degraded {
            ProcessingState::Degraded
        } else {
            ProcessingState::Ready
        };
        let updated = self.lock_catalog().update(id, |f| {
            match thumbnail {
                Ok(path) => {
                    f.thumbnail_path = Some(path);
                    f.thumbnail_error = None;
                }
                Err(e) => {
                    f.thumbnail_path = None;
                    f.thumbnail_error = Some(e.to_string());
                }
            }
            f.processing_state = state;
        });
        if !updated {
            debug!("{} was removed during thumbnailing", id);
            return EnrichmentOutcome::Skipped;
        }

        if degraded {
            EnrichmentOutcome::Degraded
        } else {
            EnrichmentOutcome::Ready
        }
    }

    /// Trims `[start, end)` seconds out of a catalog file into
    /// `<temp>/<stem>_trimmed.mp4` and registers the result.
    ///
    /// The new record is enriched before returning. When no duration could
    /// be read from it, the requested span is used.
    pub fn create_trimmed(
        &self,
        id: &str,
        start: f64,
        end: f64,
        settings: &EncodeSettings,
    ) -> CoreResult<MediaId> {
        let input = self.path_of(id)?;
        let output = self.editor.trimmed_output_path(&input);
        self.editor.trim(&input, &output, start, end, settings)?;

        let new_id = self.register_derived(&output, vec![id.to_string()])?;
        self.enrich_file(&new_id);
        self.lock_catalog().update(&new_id, |f| {
            if !f.duration.is_some_and(|d| d > 0.0) {
                f.duration = Some(end - start);
            }
        });
        info!("Created trimmed video {} from {}", new_id, id);
        Ok(new_id)
    }

    /// Joins catalog files in order into `<temp>/<file_name>` and registers
    /// the result. `file_name` defaults to `concatenated.mp4`.
    pub fn create_concatenated(
        &self,
        ids: &[MediaId],
        file_name: Option<&str>,
        settings: &EncodeSettings,
    ) -> CoreResult<MediaId> {
        if ids.is_empty() {
            return Err(CoreError::NoInputs);
        }
        let inputs = ids
            .iter()
            .map(|id| self.path_of(id))
            .collect::<CoreResult<Vec<_>>>()?;
        let output = self
            .editor
            .concat_output_path(file_name.unwrap_or(DEFAULT_CONCAT_FILE_NAME));
        self.editor.concat(&inputs, &output, settings)?;

        let new_id = self.register_derived(&output, ids.to_vec())?;
        self.enrich_file(&new_id);
        info!("Created concatenated video {} from {} files", new_id, ids.len());
        Ok(new_id)
    }

    fn path_of(&self, id: &str) -> CoreResult<PathBuf> {
        self.lock_catalog()
            .get(id)
            .map(|f| f.path.clone())
            .ok_or_else(|| CoreError::MediaNotFound(id.to_string()))
    }

    fn register_derived(&self, path: &Path, source_ids: Vec<MediaId>) -> CoreResult<MediaId> {
        let request = ImportRequest::from_path(path)?;
        let id = generate_id("media");
        let mut file = MediaFile::new(id.clone(), &request.path, request.size, request.last_modified);
        file.processing_state = ProcessingState::Processing;
        file.source_ids = source_ids;
        self.lock_catalog().insert(file);
        debug!("Registered derived file {} as {}", path.display(), id);
        Ok(id)
    }

    fn lock_catalog(&self) -> MutexGuard<'_, MediaCatalog> {
        self.catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Used when even the filesystem fallback failed for a non-critical reason.
fn degraded_metadata(cause: &CoreError) -> VideoMetadata {
    VideoMetadata {
        duration: 0.0,
        size: 0,
        bitrate: 0,
        video: VideoStreamInfo::default(),
        audio: None,
        is_basic_metadata: true,
        metadata_error: Some(format!("{BASIC_METADATA_NOTE} ({cause})")),
    }
}

//! Core library for the Clipdeck video clip editor.
//!
//! This crate provides media-tool availability tracking, metadata probing with
//! a degraded fallback, thumbnail extraction, trimming and concatenation, the
//! media catalog, a sequential ingestion pipeline, and the timeline model of
//! tracks and clips.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipdeck_core::{
//!     AvailabilityMonitor, CoreConfig, FfmpegTool, IngestionPipeline, MediaCatalog,
//!     TimelineModel,
//! };
//! use std::path::PathBuf;
//! use std::sync::{Arc, Mutex};
//!
//! let config = CoreConfig::default();
//! let tool = Arc::new(FfmpegTool::from_config(&config));
//! let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
//! monitor.spawn_initialize();
//!
//! let catalog = Arc::new(Mutex::new(MediaCatalog::new()));
//! let pipeline = IngestionPipeline::with_tool(&config, tool, monitor, catalog.clone());
//!
//! let report = pipeline.import(&[PathBuf::from("/videos/holiday.mp4")]);
//! let summary = pipeline.enrich(&report.accepted);
//! println!("{} ready, {} degraded", summary.ready, summary.degraded);
//!
//! let mut timeline = TimelineModel::new();
//! timeline.sync_with_media_files(catalog.lock().unwrap().list());
//! ```

pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod external;
pub mod ingest;
pub mod media;
pub mod timeline;
pub mod util;
pub mod utils;

// Re-exports for public API
pub use availability::{Availability, AvailabilityMonitor};
pub use catalog::{MediaCatalog, MediaFile, MediaId, ProcessingState};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{FfmpegTool, MediaTool, ProbeMode};
pub use ingest::{
    EnrichmentOutcome, EnrichmentSummary, ImportReport, ImportRequest, IngestionPipeline,
};
pub use media::{
    AudioStreamInfo, EncodeQuality, EncodeSettings, MediaEditor, MediaProbe,
    SUPPORTED_EXTENSIONS, ThumbnailGenerator, ThumbnailOptions, VideoMetadata, VideoStreamInfo,
    is_supported_format, mime_type_for, parse_frame_rate,
};
pub use timeline::{Clip, ClipPatch, NewClip, TimelineModel, Track, TrackPatch};
pub use utils::{format_duration, format_file_size};

// ============================================================================
// clipdeck-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the clipdeck-core library
//
// This module defines the error taxonomy shared by the probe, thumbnail,
// availability, ingestion and timeline components. Probe failures are
// classified from the external tool's message so that the ingestion pipeline
// can decide between a degraded record and a failed one.
//
// KEY COMPONENTS:
// - CoreError: every failure the library can report
// - CoreResult: result alias used across the crate
// - Helper constructors for command spawn failures and tool messages

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by the clipdeck-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The file does not exist (or the tool reported it missing).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but has zero length.
    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Permission denied accessing the file: {0}")]
    PermissionDenied(PathBuf),

    /// The tool could not make sense of the container or streams.
    #[error("File appears to be corrupted or in an unsupported format: {0}")]
    Corrupted(String),

    #[error("{operation} timed out after {} seconds", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("No video stream found in file: {0}")]
    NoVideoStream(PathBuf),

    /// The external media tool is known to be unusable.
    #[error("FFmpeg is not available. Please install FFmpeg to use video processing features.")]
    ToolUnavailable,

    /// Availability checks have not resolved within the allowed wait.
    #[error("FFmpeg availability is not yet known")]
    AvailabilityUnknown,

    /// Catch-all for probe failures that do not match a known pattern.
    #[error("Failed to get video metadata: {0}")]
    ProbeFailed(String),

    /// Frame extraction failed; the message is the tool's own.
    #[error("Failed to generate thumbnail: {0}")]
    ThumbnailFailed(String),

    /// Re-encoding a time range failed; the message is the tool's own.
    #[error("Failed to trim video: {0}")]
    TrimFailed(String),

    #[error("Failed to concatenate videos: {0}")]
    ConcatFailed(String),

    #[error("Invalid trim range: {start}s to {end}s")]
    InvalidTrimRange { start: f64, end: f64 },

    #[error("No input files provided")]
    NoInputs,

    #[error("Unsupported video format: {0}")]
    UnsupportedFormat(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    /// A clip edit would give a clip a non-positive duration or a negative
    /// start time.
    #[error("Invalid clip timing: {0}")]
    InvalidClipTiming(String),

    #[error("Media file not found in catalog: {0}")]
    MediaNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for clipdeck-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Critical errors abort enrichment for a file and mark it `Failed`.
    /// Everything else is absorbed into a degraded record.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound(_) | CoreError::EmptyFile(_) | CoreError::PermissionDenied(_)
        )
    }
}

/// Builds a `CommandStart` error, mapping a missing binary to `ToolUnavailable`.
pub fn command_start_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::ToolUnavailable
    } else {
        CoreError::CommandStart(cmd_name.into(), err)
    }
}

/// Classifies a failure message from the probe tool.
///
/// The classification only drives user-facing wording and the critical /
/// non-critical split; unknown messages fall through to `ProbeFailed`.
pub fn classify_probe_failure(path: &Path, message: &str) -> CoreError {
    if message.contains("Invalid data found") {
        CoreError::Corrupted(message.trim().to_string())
    } else if message.contains("No such file") {
        CoreError::NotFound(path.to_path_buf())
    } else if message.contains("Permission denied") {
        CoreError::PermissionDenied(path.to_path_buf())
    } else {
        CoreError::ProbeFailed(message.trim().to_string())
    }
}

/// Maps a filesystem error on `path` into the taxonomy.
pub(crate) fn fs_error(path: &Path, err: io::Error) -> CoreError {
    match err.kind() {
        io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
        _ => CoreError::Io(err),
    }
}

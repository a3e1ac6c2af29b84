//! Media metadata types and the two tool-backed extractors.
//!
//! `probe` turns ffprobe output into [`VideoMetadata`], `thumbnail` renders
//! preview frames, `edit` trims and joins files, and `formats` holds the
//! extension and MIME tables used at the import boundary.

pub mod edit;
pub mod formats;
pub mod probe;
pub mod thumbnail;

use serde::{Deserialize, Serialize};

pub use edit::{DEFAULT_CONCAT_FILE_NAME, EncodeQuality, EncodeSettings, MediaEditor, QualityParseError};
pub use formats::{SUPPORTED_EXTENSIONS, is_supported_format, mime_type_for};
pub use probe::{BASIC_METADATA_NOTE, MediaProbe, parse_frame_rate};
pub use thumbnail::{ThumbnailGenerator, ThumbnailOptions, thumbnail_path_for};

/// Properties of the first video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Frames per second parsed from `r_frame_rate`.
    pub fps: f64,
    pub bitrate: u64,
}

impl Default for VideoStreamInfo {
    fn default() -> Self {
        Self {
            codec: "unknown".to_string(),
            width: 0,
            height: 0,
            fps: 0.0,
            bitrate: 0,
        }
    }
}

/// Properties of the first audio stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u32,
    pub bitrate: u64,
}

/// Normalized metadata for one media file.
///
/// Numeric fields are 0 when the tool did not report them. A result built
/// from filesystem stats alone has `is_basic_metadata` set and explains why
/// in `metadata_error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Seconds.
    pub duration: f64,
    /// Bytes.
    pub size: u64,
    pub bitrate: u64,
    pub video: VideoStreamInfo,
    pub audio: Option<AudioStreamInfo>,
    pub is_basic_metadata: bool,
    pub metadata_error: Option<String>,
}

impl VideoMetadata {
    /// `WxH`, or `"Unknown"` when either dimension is missing.
    pub fn resolution(&self) -> String {
        if self.video.width > 0 && self.video.height > 0 {
            format!("{}x{}", self.video.width, self.video.height)
        } else {
            "Unknown".to_string()
        }
    }
}

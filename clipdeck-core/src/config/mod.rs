//! Configuration structures and constants for the clipdeck-core library.
//!
//! This module provides the configuration system for the ingestion pipeline:
//! external tool locations, timeout discipline, availability polling and
//! thumbnail rendering parameters.

mod builder;

use std::path::PathBuf;
use std::time::Duration;

pub use builder::CoreConfigBuilder;

use crate::error::{CoreError, CoreResult};
use crate::media::thumbnail::ThumbnailOptions;

// Default constants

/// Default ffmpeg executable, resolved through `PATH`.
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Default ffprobe executable, resolved through `PATH`.
pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

/// Hard bound on the primary metadata probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard bound on the quieter fallback probe.
pub const DEFAULT_FALLBACK_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Hard bound on the fast `-version` availability check.
pub const DEFAULT_AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Hard bound on rendering one thumbnail frame.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Hard bound on a trim or concatenation re-encode.
pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on a single availability wait before the state is re-read.
pub const DEFAULT_AVAILABILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a tool call waits for an unresolved availability state.
pub const DEFAULT_AVAILABILITY_WAIT: Duration = Duration::from_secs(5);

/// Seek offsets (seconds) tried in order when rendering a thumbnail.
/// The first entry is the primary attempt.
pub const DEFAULT_THUMBNAIL_OFFSETS: [f64; 5] = [1.0, 0.5, 2.0, 5.0, 10.0];

/// Subdirectory of the temp dir that holds generated thumbnails.
pub const THUMBNAIL_DIR_NAME: &str = "thumbnails";

/// Main configuration structure for the clipdeck-core library.
///
/// All fields have sensible defaults; the builder provides a fluent way to
/// override individual values.
///
/// # Examples
///
/// ```rust
/// use clipdeck_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .ffprobe_path("/usr/local/bin/ffprobe")
///     .probe_timeout(Duration::from_secs(10))
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// ffmpeg executable used for rendering and format listing
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable used for metadata extraction and the fast check
    pub ffprobe_path: PathBuf,

    /// Base directory for generated files (thumbnails live below it)
    pub temp_dir: PathBuf,

    /// Timeout for the primary probe
    pub probe_timeout: Duration,

    /// Timeout for the quiet fallback probe
    pub fallback_probe_timeout: Duration,

    /// Timeout for the fast availability check
    pub availability_timeout: Duration,

    /// Timeout for a single thumbnail render
    pub render_timeout: Duration,

    /// Timeout for trim and concatenation jobs
    pub encode_timeout: Duration,

    /// Polling interval used while waiting on availability
    pub availability_poll_interval: Duration,

    /// Bounded wait applied before a tool call when availability is unknown
    pub availability_wait: Duration,

    /// Size and quality of generated thumbnails
    pub thumbnail: ThumbnailOptions,

    /// Offsets tried in order by the thumbnail fallback
    pub thumbnail_offsets: Vec<f64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            ffprobe_path: PathBuf::from(DEFAULT_FFPROBE_PATH),
            temp_dir: std::env::temp_dir().join("clipdeck"),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            fallback_probe_timeout: DEFAULT_FALLBACK_PROBE_TIMEOUT,
            availability_timeout: DEFAULT_AVAILABILITY_TIMEOUT,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            encode_timeout: DEFAULT_ENCODE_TIMEOUT,
            availability_poll_interval: DEFAULT_AVAILABILITY_POLL_INTERVAL,
            availability_wait: DEFAULT_AVAILABILITY_WAIT,
            thumbnail: ThumbnailOptions::default(),
            thumbnail_offsets: DEFAULT_THUMBNAIL_OFFSETS.to_vec(),
        }
    }
}

impl CoreConfig {
    /// Directory where thumbnails are written.
    pub fn thumbnail_dir(&self) -> PathBuf {
        self.temp_dir.join(THUMBNAIL_DIR_NAME)
    }

    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        let timeouts = [
            ("probe_timeout", self.probe_timeout),
            ("fallback_probe_timeout", self.fallback_probe_timeout),
            ("availability_timeout", self.availability_timeout),
            ("render_timeout", self.render_timeout),
            ("encode_timeout", self.encode_timeout),
            ("availability_poll_interval", self.availability_poll_interval),
        ];
        for (name, value) in timeouts {
            if value.is_zero() {
                return Err(CoreError::Config(format!("{name} must be greater than zero")));
            }
        }

        if self.availability_poll_interval >= self.availability_wait {
            return Err(CoreError::Config(format!(
                "availability_poll_interval ({:?}) must be shorter than availability_wait ({:?})",
                self.availability_poll_interval, self.availability_wait
            )));
        }

        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(CoreError::Config(format!(
                "thumbnail size must be non-zero, got {}x{}",
                self.thumbnail.width, self.thumbnail.height
            )));
        }

        if !(1..=31).contains(&self.thumbnail.quality) {
            return Err(CoreError::Config(format!(
                "thumbnail quality must be between 1 and 31, got {}",
                self.thumbnail.quality
            )));
        }

        if self.thumbnail_offsets.is_empty() {
            return Err(CoreError::Config(
                "at least one thumbnail offset is required".to_string(),
            ));
        }

        if let Some(bad) = self
            .thumbnail_offsets
            .iter()
            .find(|offset| !offset.is_finite() || **offset < 0.0)
        {
            return Err(CoreError::Config(format!("invalid thumbnail offset: {bad}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probe_timeout, Duration::from_secs(30));
        assert_eq!(config.fallback_probe_timeout, Duration::from_secs(15));
        assert_eq!(config.availability_timeout, Duration::from_secs(5));
        assert_eq!(config.render_timeout, Duration::from_secs(30));
        assert_eq!(config.encode_timeout, Duration::from_secs(1800));
        assert_eq!(config.thumbnail_offsets, vec![1.0, 0.5, 2.0, 5.0, 10.0]);
        assert!(config.thumbnail_dir().ends_with("clipdeck/thumbnails"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = CoreConfig {
            probe_timeout: Duration::ZERO,
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            availability_poll_interval: Duration::from_secs(10),
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CoreConfig {
            render_timeout: Duration::ZERO,
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CoreConfig {
            thumbnail_offsets: vec![],
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CoreConfig {
            thumbnail_offsets: vec![1.0, -2.0],
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.thumbnail.quality = 0;
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.thumbnail.width = 0;
        assert!(config.validate().is_err());
    }
}

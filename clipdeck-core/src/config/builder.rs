// ============================================================================
// clipdeck-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating CoreConfig instances. Every field starts
// at its default; callers (usually the CLI) only override what they need.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::media::thumbnail::ThumbnailOptions;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use clipdeck_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("/opt/ffmpeg/bin/ffmpeg")
///     .temp_dir(PathBuf::from("/tmp/clipdeck"))
///     .thumbnail_size(320, 180)
///     .build();
/// assert_eq!(config.thumbnail.width, 320);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ffmpeg executable.
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    /// Sets the ffprobe executable.
    pub fn ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffprobe_path = path.into();
        self
    }

    /// Sets the base directory for generated files.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = temp_dir;
        self
    }

    /// Sets the timeout of the primary probe.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Sets the timeout of the quiet fallback probe.
    pub fn fallback_probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.fallback_probe_timeout = timeout;
        self
    }

    /// Sets the timeout of the fast availability check.
    pub fn availability_timeout(mut self, timeout: Duration) -> Self {
        self.config.availability_timeout = timeout;
        self
    }

    /// Sets the timeout of a single thumbnail render.
    pub fn render_timeout(mut self, timeout: Duration) -> Self {
        self.config.render_timeout = timeout;
        self
    }

    /// Sets the timeout of trim and concatenation jobs.
    pub fn encode_timeout(mut self, timeout: Duration) -> Self {
        self.config.encode_timeout = timeout;
        self
    }

    /// Sets the availability polling interval.
    pub fn availability_poll_interval(mut self, interval: Duration) -> Self {
        self.config.availability_poll_interval = interval;
        self
    }

    /// Sets how long tool calls wait for availability to resolve.
    pub fn availability_wait(mut self, wait: Duration) -> Self {
        self.config.availability_wait = wait;
        self
    }

    /// Sets the thumbnail dimensions.
    pub fn thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.config.thumbnail.width = width;
        self.config.thumbnail.height = height;
        self
    }

    /// Sets the thumbnail JPEG quality (1 best, 31 worst).
    pub fn thumbnail_quality(mut self, quality: u8) -> Self {
        self.config.thumbnail.quality = quality;
        self
    }

    /// Replaces all thumbnail options at once.
    pub fn thumbnail(mut self, options: ThumbnailOptions) -> Self {
        self.config.thumbnail = options;
        self
    }

    /// Sets the ordered offsets used by the thumbnail fallback.
    pub fn thumbnail_offsets(mut self, offsets: Vec<f64>) -> Self {
        self.config.thumbnail_offsets = offsets;
        self
    }

    /// Builds the configuration. Call `validate()` on the result before use.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

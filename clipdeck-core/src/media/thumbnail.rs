// ============================================================================
// clipdeck-core/src/media/thumbnail.rs
// ============================================================================
//
// THUMBNAILS: One JPEG preview frame per media file
//
// A single render seeks to an offset and writes one frame at the requested
// size and quality. Short clips often have nothing at the preferred offset,
// so `generate_with_fallback` walks the configured offset list in order and
// stops at the first success.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityMonitor;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{MediaTool, RenderRequest};

/// Output geometry and JPEG quality (ffmpeg `-q:v`, 2 is best).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 160,
            height: 90,
            quality: 2,
        }
    }
}

/// Canonical thumbnail location for a media file.
pub fn thumbnail_path_for(thumbnail_dir: &Path, media_id: &str) -> PathBuf {
    thumbnail_dir.join(format!("{media_id}.jpg"))
}

/// Renders preview frames through the external tool.
pub struct ThumbnailGenerator {
    tool: Arc<dyn MediaTool>,
    monitor: Arc<AvailabilityMonitor>,
    offsets: Vec<f64>,
    timeout: Duration,
}

impl ThumbnailGenerator {
    pub fn new(tool: Arc<dyn MediaTool>, monitor: Arc<AvailabilityMonitor>, config: &CoreConfig) -> Self {
        Self {
            tool,
            monitor,
            offsets: config.thumbnail_offsets.clone(),
            timeout: config.render_timeout,
        }
    }

    /// Offsets tried by `generate_with_fallback`, in order.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Renders one frame at `offset` seconds into `output`.
    ///
    /// The output directory is created if needed. Returns the output path.
    pub fn generate(
        &self,
        input: &Path,
        output: &Path,
        offset: f64,
        options: &ThumbnailOptions,
    ) -> CoreResult<PathBuf> {
        if !input.is_file() {
            return Err(CoreError::NotFound(input.to_path_buf()));
        }
        self.monitor.require()?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!(
            "Rendering thumbnail for {} at {}s -> {}",
            input.display(),
            offset,
            output.display()
        );
        self.tool.render(
            &RenderRequest {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                seek: offset.max(0.0),
                frame_count: 1,
                width: options.width,
                height: options.height,
                quality: options.quality,
            },
            self.timeout,
        )?;

        Ok(output.to_path_buf())
    }

    /// Tries each configured offset in order until one render succeeds.
    ///
    /// Render failures move on to the next offset; the last one is returned if
    /// every offset fails. A missing input or an unusable tool fails at once.
    pub fn generate_with_fallback(
        &self,
        input: &Path,
        output: &Path,
        options: &ThumbnailOptions,
    ) -> CoreResult<PathBuf> {
        let mut last_err = CoreError::ThumbnailFailed("no thumbnail offsets configured".to_string());

        for &offset in &self.offsets {
            match self.generate(input, output, offset, options) {
                Ok(path) => {
                    info!("Generated thumbnail for {} at {}s", input.display(), offset);
                    return Ok(path);
                }
                Err(e @ CoreError::ThumbnailFailed(_)) => {
                    warn!(
                        "Thumbnail at {}s failed for {}: {}",
                        offset,
                        input.display(),
                        e
                    );
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }
}

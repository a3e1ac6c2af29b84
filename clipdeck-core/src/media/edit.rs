// ============================================================================
// clipdeck-core/src/media/edit.rs
// ============================================================================
//
// EDITING: Trim a time range out of a file, or join files end to end
//
// Both operations re-encode through the external tool with the same codec,
// preset and CRF settings. A concatenation of a single input is a plain file
// copy and never touches the tool.
//
// KEY COMPONENTS:
// - EncodeQuality: named quality presets and their CRF values
// - EncodeSettings: codecs, preset and quality for one job
// - MediaEditor: precondition checks, availability gate, tool invocation

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::probe::check_preconditions;
use crate::availability::AvailabilityMonitor;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, fs_error};
use crate::external::{ConcatRequest, MediaTool, TrimRequest};

/// File name used for a concatenation when the caller gives none.
pub const DEFAULT_CONCAT_FILE_NAME: &str = "concatenated.mp4";

/// Quality preset for re-encoding.
///
/// Each preset maps to an x264 constant rate factor; lower is better.
///
/// # Examples
///
/// ```rust
/// use clipdeck_core::media::EncodeQuality;
/// use std::str::FromStr;
///
/// assert_eq!(EncodeQuality::default().crf(), 23);
/// assert_eq!(EncodeQuality::from_str("high").unwrap().crf(), 18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EncodeQuality {
    Low,
    #[default]
    Medium,
    High,
    Lossless,
}

impl EncodeQuality {
    #[must_use]
    pub fn crf(self) -> u8 {
        match self {
            EncodeQuality::Low => 28,
            EncodeQuality::Medium => 23,
            EncodeQuality::High => 18,
            EncodeQuality::Lossless => 0,
        }
    }
}

/// Error type for `EncodeQuality` parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityParseError {
    pub invalid_value: String,
}

impl fmt::Display for QualityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid quality: {} (expected low, medium, high or lossless)",
            self.invalid_value
        )
    }
}

impl std::error::Error for QualityParseError {}

impl FromStr for EncodeQuality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(EncodeQuality::Low),
            "medium" => Ok(EncodeQuality::Medium),
            "high" => Ok(EncodeQuality::High),
            "lossless" => Ok(EncodeQuality::Lossless),
            _ => Err(QualityParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// Codec and rate-control settings for one re-encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    /// x264 speed preset.
    pub preset: String,
    pub quality: EncodeQuality,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "fast".to_string(),
            quality: EncodeQuality::Medium,
        }
    }
}

impl EncodeSettings {
    pub fn with_quality(quality: EncodeQuality) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }
}

/// Trims and concatenates files through the external tool.
pub struct MediaEditor {
    tool: Arc<dyn MediaTool>,
    monitor: Arc<AvailabilityMonitor>,
    timeout: Duration,
    temp_dir: PathBuf,
}

impl MediaEditor {
    pub fn new(tool: Arc<dyn MediaTool>, monitor: Arc<AvailabilityMonitor>, config: &CoreConfig) -> Self {
        Self {
            tool,
            monitor,
            timeout: config.encode_timeout,
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// `<temp_dir>/<stem>_trimmed.mp4`
    pub fn trimmed_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        self.temp_dir.join(format!("{stem}_trimmed.mp4"))
    }

    /// `<temp_dir>/<file_name>`
    pub fn concat_output_path(&self, file_name: &str) -> PathBuf {
        self.temp_dir.join(file_name)
    }

    /// Re-encodes `[start, end)` seconds of `input` into `output`.
    ///
    /// The range must be finite with `0 <= start < end`.
    pub fn trim(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: f64,
        settings: &EncodeSettings,
    ) -> CoreResult<PathBuf> {
        if !(start.is_finite() && end.is_finite() && start >= 0.0 && end > start) {
            return Err(CoreError::InvalidTrimRange { start, end });
        }
        check_preconditions(input)?;
        self.monitor.require()?;
        create_parent(output)?;

        debug!(
            "Trimming {} from {}s to {}s -> {}",
            input.display(),
            start,
            end,
            output.display()
        );
        self.tool.trim(
            &TrimRequest {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                start,
                duration: end - start,
                settings: settings.clone(),
            },
            self.timeout,
        )?;

        info!("Video trimmed: {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Joins `inputs` in order into `output`. A single input is copied.
    pub fn concat(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        settings: &EncodeSettings,
    ) -> CoreResult<PathBuf> {
        self.monitor.require()?;
        if inputs.is_empty() {
            return Err(CoreError::NoInputs);
        }
        for input in inputs {
            check_preconditions(input)?;
        }
        create_parent(output)?;

        if let [single] = inputs {
            debug!("Single input, copying {} -> {}", single.display(), output.display());
            fs::copy(single, output).map_err(|e| fs_error(single, e))?;
            return Ok(output.to_path_buf());
        }

        debug!("Concatenating {} files -> {}", inputs.len(), output.display());
        self.tool.concat(
            &ConcatRequest {
                inputs: inputs.to_vec(),
                output: output.to_path_buf(),
                settings: settings.clone(),
            },
            self.timeout,
        )?;

        info!("Video concatenation completed: {}", output.display());
        Ok(output.to_path_buf())
    }
}

fn create_parent(output: &Path) -> CoreResult<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// ============================================================================
// clipdeck-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: The narrow interface to the media-processing tool
//
// Decoding, encoding and frame rendering are delegated to ffmpeg/ffprobe. This
// module defines the operations the rest of the crate is allowed to ask of
// that tool, a production implementation that drives the real binaries, and
// a scripted test double.
//
// KEY COMPONENTS:
// - MediaTool: trait for probe, render, trim, concat and the two checks
// - FfmpegTool: child-process implementation with hard timeouts
// - RawProbe: lenient model of ffprobe's JSON output
// - mocks::ScriptedTool: deterministic in-process implementation for tests

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreResult;
use crate::media::EncodeSettings;

pub mod ffmpeg_tool;
pub mod ffprobe_output;
pub mod mocks;

pub use ffmpeg_tool::FfmpegTool;
pub use ffprobe_output::{RawFormat, RawProbe, RawStream};

/// Which set of ffprobe flags to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMode {
    /// Normal verbosity so failures carry a diagnosable message.
    Primary,
    /// `-v quiet` retry used only after the primary probe failed.
    Quiet,
}

/// A single-frame render: seek, grab one frame, scale, encode as an image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Seek position in seconds.
    pub seek: f64,
    pub frame_count: u32,
    pub width: u32,
    pub height: u32,
    /// ffmpeg `-q:v` value (1 best, 31 worst).
    pub quality: u8,
}

/// Re-encode `duration` seconds of `input` starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: f64,
    pub duration: f64,
    pub settings: EncodeSettings,
}

/// Join `inputs` in order and re-encode into `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatRequest {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub settings: EncodeSettings,
}

/// Operations the external media tool provides.
///
/// Implementations must be shareable across the enrichment worker thread.
pub trait MediaTool: Send + Sync {
    /// Extracts container and stream metadata without decoding frames.
    fn probe(&self, path: &Path, mode: ProbeMode, timeout: Duration) -> CoreResult<RawProbe>;

    /// Renders one frame to an image file, overwriting any existing output.
    fn render(&self, request: &RenderRequest, timeout: Duration) -> CoreResult<()>;

    /// Cuts a time range out of one file, overwriting any existing output.
    fn trim(&self, request: &TrimRequest, timeout: Duration) -> CoreResult<()>;

    /// Joins several files into one, overwriting any existing output.
    fn concat(&self, request: &ConcatRequest, timeout: Duration) -> CoreResult<()>;

    /// Enumerates the container formats the tool supports.
    fn list_formats(&self) -> CoreResult<Vec<String>>;

    /// Runs the tool with its version flag; `Ok(true)` iff it exited zero
    /// within `timeout`.
    fn version_check(&self, timeout: Duration) -> CoreResult<bool>;
}

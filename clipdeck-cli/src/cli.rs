// clipdeck-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use clipdeck_core::EncodeQuality;
use clipdeck_core::config::{CoreConfig, CoreConfigBuilder};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipdeck: video clip ingestion and timeline tool",
    long_about = "Probes video files, renders preview thumbnails, trims and joins videos, and lays imported clips out on a two-track timeline using ffmpeg via the clipdeck-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// External tool and scratch-space locations shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// Path to the ffmpeg executable
    #[arg(long, global = true, value_name = "PATH", env = "CLIPDECK_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, global = true, value_name = "PATH", env = "CLIPDECK_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Directory for generated files (thumbnails are written below it)
    #[arg(long, global = true, value_name = "DIR", env = "CLIPDECK_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl ToolArgs {
    /// Core configuration with these overrides applied over the defaults.
    pub fn core_config(&self) -> CoreConfig {
        let mut builder = CoreConfigBuilder::new();
        if let Some(ffmpeg) = &self.ffmpeg {
            builder = builder.ffmpeg_path(ffmpeg);
        }
        if let Some(ffprobe) = &self.ffprobe {
            builder = builder.ffprobe_path(ffprobe);
        }
        if let Some(temp_dir) = &self.temp_dir {
            builder = builder.temp_dir(temp_dir.clone());
        }
        builder.build()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Checks whether ffmpeg and ffprobe are usable
    Check,
    /// Prints the metadata of one video file
    Probe(ProbeArgs),
    /// Renders a preview thumbnail for one video file
    Thumbnail(ThumbnailArgs),
    /// Imports video files, enriches them and lays them out on a timeline
    Import(ImportArgs),
    /// Re-encodes a time range of one video file
    Trim(TrimArgs),
    /// Joins video files end to end
    Concat(ConcatArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to probe
    #[arg(required = true, value_name = "FILE")]
    pub input: PathBuf,

    /// Print the metadata as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail instead of falling back to a quieter probe and basic file metadata
    #[arg(long)]
    pub no_fallback: bool,
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Video file to render a frame from
    #[arg(required = true, value_name = "FILE")]
    pub input: PathBuf,

    /// Output image (defaults to <temp-dir>/thumbnails/<file stem>.jpg)
    #[arg(short, long, value_name = "IMAGE")]
    pub output: Option<PathBuf>,

    /// Render at this offset only instead of trying the fallback offsets
    #[arg(long, value_name = "SECONDS")]
    pub offset: Option<f64>,

    /// Thumbnail width in pixels
    #[arg(long, default_value_t = 160)]
    pub width: u32,

    /// Thumbnail height in pixels
    #[arg(long, default_value_t = 90)]
    pub height: u32,

    /// JPEG quality passed to ffmpeg (1 best, 31 worst)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=31))]
    pub quality: u8,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Video files to import
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Print the catalog and timeline as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Video file to trim
    #[arg(required = true, value_name = "FILE")]
    pub input: PathBuf,

    /// Start of the kept range in seconds
    #[arg(long, value_name = "SECONDS")]
    pub start: f64,

    /// End of the kept range in seconds
    #[arg(long, value_name = "SECONDS")]
    pub end: f64,

    /// Output video (defaults to <temp-dir>/<file stem>_trimmed.mp4)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Encoding quality: low, medium, high or lossless
    #[arg(long, default_value = "medium")]
    pub quality: EncodeQuality,
}

#[derive(Args, Debug)]
pub struct ConcatArgs {
    /// Video files to join, in order
    #[arg(required = true, value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    /// Output video (defaults to <temp-dir>/concatenated.mp4)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Encoding quality: low, medium, high or lossless
    #[arg(long, default_value = "medium")]
    pub quality: EncodeQuality,
}

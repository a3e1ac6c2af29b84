// ============================================================================
// clipdeck-core/src/external/ffmpeg_tool.rs
// ============================================================================
//
// FFMPEG TOOL: Production implementation of MediaTool
//
// ffprobe, the version check and the format listing run as plain child
// processes under `run_with_timeout`. Frame rendering, trimming and
// concatenation go through ffmpeg-sidecar so the tool's error events can be
// collected and reported verbatim when a job fails. Every sidecar job runs
// under a deadline and is killed when it passes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use log::{debug, error, warn};

use ffmpeg_sidecar::iter::FfmpegIterator;

use super::{ConcatRequest, MediaTool, ProbeMode, RawProbe, RenderRequest, TrimRequest};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, classify_probe_failure, command_start_error};
use crate::media::EncodeSettings;
use crate::util::{WAIT_POLL_INTERVAL, run_with_timeout};

/// Upper bound on `ffmpeg -formats`; the listing is slow but never this slow.
const LIST_FORMATS_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives the real ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FfmpegTool {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(&config.ffmpeg_path, &config.ffprobe_path)
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe_path
    }

    fn probe_command(&self, path: &Path, mode: ProbeMode) -> Command {
        let mut cmd = Command::new(&self.ffprobe_path);
        match mode {
            ProbeMode::Primary => {
                cmd.args([
                    "-v",
                    "error",
                    "-hide_banner",
                    "-show_format",
                    "-show_streams",
                    "-print_format",
                    "json",
                ]);
            }
            ProbeMode::Quiet => {
                cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]);
            }
        }
        cmd.arg(path);
        cmd
    }

    fn render_command(&self, request: &RenderRequest) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.hide_banner();
        // Seek before the input so ffmpeg seeks by keyframe instead of decoding
        // everything up to the offset.
        cmd.arg("-ss");
        cmd.arg(request.seek.to_string());
        cmd.input(&request.input);
        cmd.arg("-frames:v");
        cmd.arg(request.frame_count.to_string());
        cmd.arg("-s");
        cmd.arg(format!("{}x{}", request.width, request.height));
        cmd.arg("-q:v");
        cmd.arg(request.quality.to_string());
        cmd.arg("-f");
        cmd.arg("image2");
        cmd.overwrite();
        cmd.output(&request.output);
        cmd
    }

    fn trim_command(&self, request: &TrimRequest) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.hide_banner();
        cmd.arg("-ss");
        cmd.arg(request.start.to_string());
        cmd.input(&request.input);
        cmd.arg("-t");
        cmd.arg(request.duration.to_string());
        push_encode_args(&mut cmd, &request.settings);
        cmd.overwrite();
        cmd.output(&request.output);
        cmd
    }

    fn concat_command(&self, list_path: &Path, request: &ConcatRequest) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.hide_banner();
        cmd.args(["-f", "concat", "-safe", "0"]);
        cmd.input(list_path);
        push_encode_args(&mut cmd, &request.settings);
        cmd.overwrite();
        cmd.output(&request.output);
        cmd
    }

    /// Runs a sidecar job to completion or until `timeout` passes.
    ///
    /// Error and fatal log lines are collected on a separate thread; a
    /// non-zero exit is reported through `fail` with those lines joined.
    fn run_sidecar(
        &self,
        cmd: &mut FfmpegCommand,
        label: &str,
        timeout: Duration,
        fail: fn(String) -> CoreError,
    ) -> CoreResult<()> {
        debug!("Running {} command: {:?}", label, cmd);

        let mut child = cmd.spawn().map_err(|e| command_start_error(label, e))?;
        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(fail(format!("reading {label} output: {e}")));
            }
        };
        let collector = thread::spawn(move || collect_errors(events));

        let started = Instant::now();
        let status = loop {
            match child.as_inner_mut().try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= timeout => {
                    warn!("{} exceeded {:?}; killing", label, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    // The collector finishes on its own once stderr closes.
                    drop(collector);
                    return Err(CoreError::Timeout {
                        operation: label.to_string(),
                        after: timeout,
                    });
                }
                Ok(None) => thread::sleep(WAIT_POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(fail(format!("waiting for {label}: {e}")));
                }
            }
        };

        let messages = collector.join().unwrap_or_default();
        if status.success() {
            return Ok(());
        }

        error!("{} failed with {}", label, status);
        let message = if messages.is_empty() {
            format!("{label} exited with {status}")
        } else {
            messages.join("\n")
        };
        Err(fail(message))
    }
}

fn push_encode_args(cmd: &mut FfmpegCommand, settings: &EncodeSettings) {
    cmd.codec_video(&settings.video_codec);
    cmd.codec_audio(&settings.audio_codec);
    cmd.preset(&settings.preset);
    cmd.crf(u32::from(settings.quality.crf()));
}

fn collect_errors(events: FfmpegIterator) -> Vec<String> {
    events
        .filter_map(|event| match event {
            FfmpegEvent::Error(msg) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                Some(msg)
            }
            _ => None,
        })
        .collect()
}

/// Contents of an ffmpeg concat-demuxer list, one `file` line per input.
///
/// Single quotes in paths are closed, escaped and reopened.
fn concat_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|input| {
            let path = input.to_string_lossy().replace('\'', "'\\''");
            format!("file '{path}'\n")
        })
        .collect()
}

/// `<output>.concat.txt`
fn concat_list_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".concat.txt");
    PathBuf::from(name)
}

impl MediaTool for FfmpegTool {
    fn probe(&self, path: &Path, mode: ProbeMode, timeout: Duration) -> CoreResult<RawProbe> {
        let label = match mode {
            ProbeMode::Primary => "ffprobe",
            ProbeMode::Quiet => "ffprobe (quiet)",
        };
        let output = run_with_timeout(&mut self.probe_command(path, mode), label, timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("{} failed for {}: {}", label, path.display(), stderr.trim());
            let message = if stderr.trim().is_empty() {
                format!("{label} exited with {}", output.status)
            } else {
                stderr.into_owned()
            };
            return Err(classify_probe_failure(path, &message));
        }

        RawProbe::from_json(&output.stdout).map_err(|e| {
            warn!("Unparseable {} output for {}: {}", label, path.display(), e);
            CoreError::ProbeFailed(format!("{label} output deserialization: {e}"))
        })
    }

    fn render(&self, request: &RenderRequest, timeout: Duration) -> CoreResult<()> {
        self.run_sidecar(
            &mut self.render_command(request),
            "ffmpeg (thumbnail)",
            timeout,
            CoreError::ThumbnailFailed,
        )
    }

    fn trim(&self, request: &TrimRequest, timeout: Duration) -> CoreResult<()> {
        self.run_sidecar(
            &mut self.trim_command(request),
            "ffmpeg (trim)",
            timeout,
            CoreError::TrimFailed,
        )
    }

    fn concat(&self, request: &ConcatRequest, timeout: Duration) -> CoreResult<()> {
        // The demuxer resolves relative entries against the list's directory.
        let inputs = request
            .inputs
            .iter()
            .map(std::path::absolute)
            .collect::<io::Result<Vec<_>>>()?;
        let list_path = concat_list_path(&request.output);
        fs::write(&list_path, concat_list(&inputs))?;

        let result = self.run_sidecar(
            &mut self.concat_command(&list_path, request),
            "ffmpeg (concat)",
            timeout,
            CoreError::ConcatFailed,
        );
        if let Err(e) = fs::remove_file(&list_path) {
            warn!("Could not remove concat list {}: {}", list_path.display(), e);
        }
        result
    }

    fn list_formats(&self) -> CoreResult<Vec<String>> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-formats"]);
        let output = run_with_timeout(&mut cmd, "ffmpeg (formats)", LIST_FORMATS_TIMEOUT)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::ProbeFailed(format!(
                "ffmpeg -formats exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_format_listing(&String::from_utf8_lossy(&output.stdout)))
    }

    fn version_check(&self, timeout: Duration) -> CoreResult<bool> {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.arg("-version");
        let output = run_with_timeout(&mut cmd, "ffprobe -version", timeout)?;
        Ok(output.status.success())
    }
}

/// Extracts format names from `ffmpeg -formats` output.
///
/// Rows follow a `--` separator and look like ` DE mp4   MP4 (MPEG-4 Part 14)`.
fn parse_format_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip_while(|line| line.trim() != "--")
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            if !flags.chars().all(|c| matches!(c, 'D' | 'E' | 'd')) {
                return None;
            }
            parts.next().map(str::to_string)
        })
        .collect()
}

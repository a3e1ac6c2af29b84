// ============================================================================
// clipdeck-core/src/media/probe.rs
// ============================================================================
//
// MEDIA PROBE: Metadata extraction with a three-step fallback
//
// 1. Primary probe: normal ffprobe verbosity, 30 second bound. Failures are
//    classified from the tool's message.
// 2. Quiet probe: `-v quiet` retry, 15 second bound, same normalization.
// 3. Basic metadata: filesystem size only, every media field defaulted and
//    the result marked as degraded. Never touches the tool.
//
// `probe_with_fallback` chains the three, so for an existing, non-empty file
// it always yields a result.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::{AudioStreamInfo, VideoMetadata, VideoStreamInfo};
use crate::availability::AvailabilityMonitor;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, fs_error};
use crate::external::ffprobe_output::{value_as_f64, value_as_u64};
use crate::external::{MediaTool, ProbeMode, RawProbe};

/// Marker carried by degraded metadata.
pub const BASIC_METADATA_NOTE: &str = "Could not extract detailed metadata from file";

/// Extracts and normalizes metadata through the external tool.
pub struct MediaProbe {
    tool: Arc<dyn MediaTool>,
    monitor: Arc<AvailabilityMonitor>,
    primary_timeout: Duration,
    fallback_timeout: Duration,
}

impl MediaProbe {
    pub fn new(tool: Arc<dyn MediaTool>, monitor: Arc<AvailabilityMonitor>, config: &CoreConfig) -> Self {
        Self {
            tool,
            monitor,
            primary_timeout: config.probe_timeout,
            fallback_timeout: config.fallback_probe_timeout,
        }
    }

    /// Primary probe.
    ///
    /// Fails with `NotFound` / `EmptyFile` before the tool is invoked, with
    /// `ToolUnavailable` when the gate is closed, `Timeout` when the bound is
    /// hit, `NoVideoStream` when the file has no video, and otherwise with the
    /// classified tool failure.
    pub fn probe(&self, path: &Path) -> CoreResult<VideoMetadata> {
        self.run(path, ProbeMode::Primary, self.primary_timeout)
    }

    /// Quiet fallback probe, used after the primary probe failed.
    pub fn probe_quiet(&self, path: &Path) -> CoreResult<VideoMetadata> {
        self.run(path, ProbeMode::Quiet, self.fallback_timeout)
    }

    /// Filesystem-only metadata. Only fails if the file cannot be stat'ed.
    pub fn basic_metadata(&self, path: &Path) -> CoreResult<VideoMetadata> {
        let size = fs::metadata(path).map_err(|e| fs_error(path, e))?.len();
        Ok(VideoMetadata {
            duration: 0.0,
            size,
            bitrate: 0,
            video: VideoStreamInfo::default(),
            audio: None,
            is_basic_metadata: true,
            metadata_error: Some(BASIC_METADATA_NOTE.to_string()),
        })
    }

    /// Primary, then quiet, then basic metadata.
    ///
    /// Missing and empty files are reported as errors; every tool failure is
    /// absorbed into a degraded result.
    pub fn probe_with_fallback(&self, path: &Path) -> CoreResult<VideoMetadata> {
        check_preconditions(path)?;

        let primary_err = match self.probe(path) {
            Ok(metadata) => return Ok(metadata),
            Err(e) => e,
        };
        warn!(
            "Standard metadata extraction failed for {}: {}",
            path.display(),
            primary_err
        );

        let last_err = if matches!(
            primary_err,
            CoreError::ToolUnavailable | CoreError::AvailabilityUnknown
        ) {
            primary_err
        } else {
            match self.probe_quiet(path) {
                Ok(metadata) => {
                    info!("Quiet probe recovered metadata for {}", path.display());
                    return Ok(metadata);
                }
                Err(e) => {
                    warn!("Fallback metadata extraction failed for {}: {}", path.display(), e);
                    e
                }
            }
        };

        info!("Using basic file metadata for {}", path.display());
        let mut basic = self.basic_metadata(path)?;
        basic.metadata_error = Some(format!("{BASIC_METADATA_NOTE} ({last_err})"));
        Ok(basic)
    }

    fn run(&self, path: &Path, mode: ProbeMode, timeout: Duration) -> CoreResult<VideoMetadata> {
        let fs_size = check_preconditions(path)?;
        self.monitor.require()?;

        debug!("Probing {} ({:?}, timeout {:?})", path.display(), mode, timeout);
        let raw = self.tool.probe(path, mode, timeout)?;
        let metadata = normalize(path, &raw, fs_size)?;

        debug!(
            "Extracted metadata for {}: duration={} resolution={} codec={} fps={}",
            path.display(),
            metadata.duration,
            metadata.resolution(),
            metadata.video.codec,
            metadata.video.fps
        );
        Ok(metadata)
    }
}

/// Checks the file exists and is non-empty; returns its size.
pub(crate) fn check_preconditions(path: &Path) -> CoreResult<u64> {
    let metadata = fs::metadata(path).map_err(|e| fs_error(path, e))?;
    if !metadata.is_file() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if metadata.len() == 0 {
        return Err(CoreError::EmptyFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Converts a raw probe into normalized metadata.
///
/// The video stream is mandatory; the audio stream is optional. Absent or
/// unparseable numbers become 0, and the container size falls back to the
/// filesystem size.
pub(crate) fn normalize(path: &Path, raw: &RawProbe, fs_size: u64) -> CoreResult<VideoMetadata> {
    let video = raw
        .first_stream("video")
        .ok_or_else(|| CoreError::NoVideoStream(path.to_path_buf()))?;
    let format = raw.format.clone().unwrap_or_default();

    let video = VideoStreamInfo {
        codec: video.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
        width: to_u32(value_as_u64(video.width.as_ref())),
        height: to_u32(value_as_u64(video.height.as_ref())),
        fps: parse_frame_rate(video.r_frame_rate.as_deref()),
        bitrate: value_as_u64(video.bit_rate.as_ref()).unwrap_or(0),
    };

    let audio = raw.first_stream("audio").map(|audio| AudioStreamInfo {
        codec: audio.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
        sample_rate: to_u32(value_as_u64(audio.sample_rate.as_ref())),
        channels: to_u32(value_as_u64(audio.channels.as_ref())),
        bitrate: value_as_u64(audio.bit_rate.as_ref()).unwrap_or(0),
    });

    Ok(VideoMetadata {
        duration: value_as_f64(format.duration.as_ref())
            .filter(|d| *d >= 0.0)
            .unwrap_or(0.0),
        size: value_as_u64(format.size.as_ref())
            .filter(|s| *s > 0)
            .unwrap_or(fs_size),
        bitrate: value_as_u64(format.bit_rate.as_ref()).unwrap_or(0),
        video,
        audio,
        is_basic_metadata: false,
        metadata_error: None,
    })
}

fn to_u32(value: Option<u64>) -> u32 {
    value.and_then(|v| u32::try_from(v).ok()).unwrap_or(0)
}

/// Parses an ffprobe rational frame rate such as `"30000/1001"`.
///
/// `N/D` yields `N / D`; a zero, absent or unparseable denominator yields the
/// bare numerator. Missing or unparseable input yields 0.
#[must_use]
pub fn parse_frame_rate(rate: Option<&str>) -> f64 {
    let Some(rate) = rate.map(str::trim).filter(|r| !r.is_empty()) else {
        return 0.0;
    };

    let mut parts = rate.splitn(2, '/');
    let numerator = parts
        .next()
        .and_then(|n| n.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite());
    let Some(numerator) = numerator else {
        return 0.0;
    };

    match parts.next().and_then(|d| d.trim().parse::<f64>().ok()) {
        Some(denominator) if denominator != 0.0 && denominator.is_finite() => {
            numerator / denominator
        }
        _ => numerator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::external::mocks::{ProbeScript, ScriptedTool, ToolCall};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const FULL_JSON: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920,
             "height": 1080, "r_frame_rate": "30000/1001", "bit_rate": "4000000"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac",
             "sample_rate": "48000", "channels": 2, "bit_rate": "128000"}
        ],
        "format": {"format_name": "mov,mp4", "duration": "12.500000",
                   "size": "6250000", "bit_rate": "4128000"}
    }"#;

    fn video_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(b"not really a video").unwrap();
        file
    }

    fn probe_with(tool: ScriptedTool, available: bool) -> (Arc<ScriptedTool>, MediaProbe) {
        let config = CoreConfigBuilder::new()
            .availability_poll_interval(Duration::from_millis(5))
            .availability_wait(Duration::from_millis(20))
            .build();
        if !available {
            tool.on_version_check(crate::external::mocks::CheckScript::Missing, Duration::ZERO);
        }
        let tool = Arc::new(tool);
        let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
        monitor.check_fast();
        (tool.clone(), MediaProbe::new(tool, monitor, &config))
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("30/1")), 30.0);
        assert!((parse_frame_rate(Some("24000/1001")) - 23.976).abs() < 0.001);
        assert_eq!(parse_frame_rate(Some("30/0")), 30.0);
        assert_eq!(parse_frame_rate(None), 0.0);
        assert_eq!(parse_frame_rate(Some("")), 0.0);
        assert_eq!(parse_frame_rate(Some("25")), 25.0);
        assert_eq!(parse_frame_rate(Some("0/0")), 0.0);
        assert_eq!(parse_frame_rate(Some("abc/1")), 0.0);
        assert_eq!(parse_frame_rate(Some("50/x")), 50.0);
    }

    #[test]
    fn test_probe_normalizes_full_output() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Json(FULL_JSON.to_string()));
        let (_, probe) = probe_with(tool, true);

        let metadata = probe.probe(file.path()).unwrap();
        assert_eq!(metadata.duration, 12.5);
        assert_eq!(metadata.size, 6_250_000);
        assert_eq!(metadata.bitrate, 4_128_000);
        assert_eq!(metadata.video.codec, "h264");
        assert_eq!(metadata.resolution(), "1920x1080");
        assert!((metadata.video.fps - 29.97).abs() < 0.01);
        assert_eq!(metadata.video.bitrate, 4_000_000);
        let audio = metadata.audio.unwrap();
        assert_eq!(audio.codec, "aac");
        assert_eq!(audio.sample_rate, 48_000);
        assert_eq!(audio.channels, 2);
        assert!(!metadata.is_basic_metadata);
    }

    #[test]
    fn test_probe_defaults_missing_fields() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(
            ProbeMode::Primary,
            ProbeScript::Json(r#"{"streams":[{"codec_type":"video"}],"format":{"duration":"N/A"}}"#.into()),
        );
        let (_, probe) = probe_with(tool, true);

        let metadata = probe.probe(file.path()).unwrap();
        assert_eq!(metadata.duration, 0.0);
        assert_eq!(metadata.size, 18); // filesystem size
        assert_eq!(metadata.video, VideoStreamInfo::default());
        assert_eq!(metadata.resolution(), "Unknown");
        assert!(metadata.audio.is_none());
    }

    #[test]
    fn test_probe_requires_video_stream() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(
            ProbeMode::Primary,
            ProbeScript::Json(r#"{"streams":[{"codec_type":"audio","codec_name":"mp3"}]}"#.into()),
        );
        let (_, probe) = probe_with(tool, true);
        assert!(matches!(probe.probe(file.path()), Err(CoreError::NoVideoStream(_))));
    }

    #[test]
    fn test_preconditions_checked_before_tool() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.mp4");
        fs::File::create(&empty).unwrap();
        let (tool, probe) = probe_with(ScriptedTool::new(), true);

        assert!(matches!(
            probe.probe(&dir.path().join("missing.mp4")),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(probe.probe(&empty), Err(CoreError::EmptyFile(_))));
        assert!(matches!(
            probe.probe_with_fallback(&empty),
            Err(CoreError::EmptyFile(_))
        ));
        assert_eq!(tool.probe_count(), 0);
    }

    #[test]
    fn test_probe_classifies_failures() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(
            ProbeMode::Primary,
            ProbeScript::Fail("moov atom not found\nInvalid data found when processing input".into()),
        );
        let (_, probe) = probe_with(tool, true);
        assert!(matches!(probe.probe(file.path()), Err(CoreError::Corrupted(_))));

        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Timeout);
        let (_, probe) = probe_with(tool, true);
        assert!(matches!(probe.probe(file.path()), Err(CoreError::Timeout { .. })));
    }

    #[test]
    fn test_timeouts_report_default_bounds() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Timeout);
        tool.on_probe(ProbeMode::Quiet, ProbeScript::Timeout);
        let (_, probe) = probe_with(tool, true);

        assert!(matches!(
            probe.probe(file.path()),
            Err(CoreError::Timeout { after, .. }) if after == Duration::from_secs(30)
        ));
        assert!(matches!(
            probe.probe_quiet(file.path()),
            Err(CoreError::Timeout { after, .. }) if after == Duration::from_secs(15)
        ));
    }

    #[test]
    fn test_fallback_uses_quiet_probe() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Timeout);
        tool.on_probe(ProbeMode::Quiet, ProbeScript::Json(FULL_JSON.to_string()));
        let (tool, probe) = probe_with(tool, true);

        let metadata = probe.probe_with_fallback(file.path()).unwrap();
        assert!(!metadata.is_basic_metadata);
        assert_eq!(metadata.video.codec, "h264");

        let modes: Vec<ProbeMode> = tool
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ToolCall::Probe { mode, .. } => Some(mode),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![ProbeMode::Primary, ProbeMode::Quiet]);
    }

    #[test]
    fn test_fallback_degrades_to_basic_metadata() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Fail("Invalid data found".into()));
        tool.on_probe(ProbeMode::Quiet, ProbeScript::Fail("exit status 1".into()));
        let (_, probe) = probe_with(tool, true);

        let metadata = probe.probe_with_fallback(file.path()).unwrap();
        assert!(metadata.is_basic_metadata);
        assert_eq!(metadata.size, 18);
        assert_eq!(metadata.duration, 0.0);
        assert_eq!(metadata.video.codec, "unknown");
        assert!(
            metadata
                .metadata_error
                .as_deref()
                .is_some_and(|m| m.starts_with(BASIC_METADATA_NOTE))
        );
    }

    #[test]
    fn test_unavailable_tool_short_circuits() {
        let file = video_file();
        let tool = ScriptedTool::new();
        tool.on_probe(ProbeMode::Primary, ProbeScript::Json(FULL_JSON.to_string()));
        let (tool, probe) = probe_with(tool, false);

        assert!(matches!(probe.probe(file.path()), Err(CoreError::ToolUnavailable)));
        let metadata = probe.probe_with_fallback(file.path()).unwrap();
        assert!(metadata.is_basic_metadata);
        assert_eq!(tool.probe_count(), 0);
    }
}

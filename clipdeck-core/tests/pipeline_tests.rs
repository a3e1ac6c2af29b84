use clipdeck_core::external::mocks::{CheckScript, ProbeScript, ScriptedTool};
use clipdeck_core::{
    AvailabilityMonitor, CoreConfig, CoreConfigBuilder, CoreError, IngestionPipeline,
    MediaCatalog, MediaProbe, ProbeMode, ProcessingState, ThumbnailGenerator, ThumbnailOptions,
};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const PROBE_JSON: &str = r#"{
    "streams": [
        {"codec_type": "video", "codec_name": "h264", "width": "1280", "height": "720",
         "r_frame_rate": "24000/1001"},
        {"codec_type": "audio", "codec_name": "opus", "sample_rate": "48000", "channels": "2"}
    ],
    "format": {"duration": "61.2", "bit_rate": "900000"}
}"#;

fn test_config(dir: &TempDir) -> CoreConfig {
    CoreConfigBuilder::new()
        .temp_dir(dir.path().join("scratch"))
        .availability_poll_interval(Duration::from_millis(5))
        .availability_wait(Duration::from_millis(250))
        .build()
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_probe_with_fallback_never_fails_for_existing_files() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let tool = Arc::new(ScriptedTool::new());
    tool.on_probe(ProbeMode::Primary, ProbeScript::Fail("Permission denied".into()));
    tool.on_probe(ProbeMode::Quiet, ProbeScript::Json(r#"{"streams":[]}"#.into()));
    let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
    monitor.initialize();
    let probe = MediaProbe::new(tool, monitor, &config);

    let path = write_file(&dir, "a.mp4", b"0123456789");
    let metadata = probe.probe_with_fallback(&path).unwrap();
    assert!(metadata.is_basic_metadata);
    assert_eq!(metadata.size, 10);
}

#[test]
fn test_require_waits_for_background_initialization() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let tool = ScriptedTool::new();
    tool.on_version_check(CheckScript::Succeed, Duration::from_millis(40));
    tool.on_probe(ProbeMode::Primary, ProbeScript::Json(PROBE_JSON.into()));
    let tool = Arc::new(tool);
    let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
    let probe = MediaProbe::new(tool, Arc::clone(&monitor), &config);

    let handle = monitor.spawn_initialize();
    let path = write_file(&dir, "a.mp4", b"data");
    let metadata = probe.probe(&path).unwrap();
    assert!((metadata.video.fps - 23.976).abs() < 0.001);
    assert_eq!(metadata.audio.unwrap().codec, "opus");
    handle.join().unwrap();
}

#[test]
fn test_unknown_availability_is_never_treated_as_available() {
    let dir = TempDir::new().unwrap();
    let config = CoreConfigBuilder::new()
        .temp_dir(dir.path().to_path_buf())
        .availability_poll_interval(Duration::from_millis(5))
        .availability_wait(Duration::from_millis(30))
        .build();
    let tool = Arc::new(ScriptedTool::new());
    tool.on_probe(ProbeMode::Primary, ProbeScript::Json(PROBE_JSON.into()));
    let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
    let probe = MediaProbe::new(tool.clone(), monitor, &config);

    let path = write_file(&dir, "a.mp4", b"data");
    assert!(matches!(probe.probe(&path), Err(CoreError::AvailabilityUnknown)));
    assert_eq!(tool.probe_count(), 0);
}

#[test]
fn test_thumbnail_fallback_offsets() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let tool = ScriptedTool::new();
    for offset in [1.0, 0.5, 2.0, 5.0] {
        tool.fail_render_at(offset, "Invalid frame");
    }
    let tool = Arc::new(tool);
    let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
    monitor.check_fast();
    let generator = ThumbnailGenerator::new(tool.clone(), monitor, &config);

    let input = write_file(&dir, "short.mp4", b"data");
    let output = config.thumbnail_dir().join("short.jpg");
    let written = generator
        .generate_with_fallback(&input, &output, &ThumbnailOptions::default())
        .unwrap();

    assert_eq!(written, output);
    assert_eq!(tool.render_offsets(), vec![1.0, 0.5, 2.0, 5.0, 10.0]);
}

#[test]
fn test_background_enrichment_tolerates_removal() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let tool = Arc::new(ScriptedTool::new());
    tool.on_probe(ProbeMode::Primary, ProbeScript::Json(PROBE_JSON.into()));
    let monitor = Arc::new(AvailabilityMonitor::new(tool.clone(), &config));
    monitor.initialize();

    let catalog = Arc::new(Mutex::new(MediaCatalog::new()));
    let pipeline = Arc::new(IngestionPipeline::with_tool(
        &config,
        tool.clone(),
        monitor,
        Arc::clone(&catalog),
    ));

    let keep = write_file(&dir, "keep.mp4", b"data");
    let drop = write_file(&dir, "drop.mp4", b"data");
    let ids = pipeline.import(&[keep, drop.clone()]).accepted;

    // Remove the second file while its own probe is running.
    let hook_catalog = Arc::clone(&catalog);
    let drop_id = ids[1].clone();
    tool.on_probe_call(move |path, _| {
        if path == drop.as_path() {
            hook_catalog.lock().unwrap().remove(&drop_id);
        }
    });

    let summary = pipeline.spawn_enrichment(ids.clone()).join().unwrap();
    assert_eq!(summary.ready, 1);
    assert_eq!(summary.skipped, 1);

    let catalog = catalog.lock().unwrap();
    assert_eq!(catalog.len(), 1);
    let kept = catalog.get(&ids[0]).unwrap();
    assert_eq!(kept.processing_state, ProcessingState::Ready);
    assert_eq!(kept.duration, Some(61.2));
    assert!(catalog.get(&ids[1]).is_none());
}

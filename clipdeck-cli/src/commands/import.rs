//! `clipdeck import`: import files, enrich them and lay them out on a timeline.

use std::sync::{Arc, Mutex};

use clipdeck_core::{
    CoreConfig, CoreResult, IngestionPipeline, MediaCatalog, MediaFile, TimelineModel,
    format_duration, format_file_size,
};
use log::info;
use serde_json::json;

use super::Services;
use crate::cli::ImportArgs;
use crate::output::{
    print_heading, print_info, print_section, print_success, print_warning, styled_state,
};

pub fn run_import(config: CoreConfig, args: ImportArgs) -> CoreResult<()> {
    let services = Services::start(config)?;
    let catalog = Arc::new(Mutex::new(MediaCatalog::new()));
    let pipeline = IngestionPipeline::with_tool(
        &services.config,
        Arc::clone(&services.tool),
        Arc::clone(&services.monitor),
        Arc::clone(&catalog),
    );

    let report = pipeline.import(&args.files);
    info!("Enriching {} file(s)", report.accepted.len());
    let summary = pipeline.enrich(&report.accepted);

    let catalog = catalog.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut timeline = TimelineModel::new();
    timeline.sync_with_media_files(catalog.list());

    if args.json {
        let rejected: Vec<_> = report
            .rejected
            .iter()
            .map(|(path, e)| json!({ "path": path, "error": e.to_string() }))
            .collect();
        let document = json!({
            "files": catalog.list(),
            "rejected": rejected,
            "summary": {
                "ready": summary.ready,
                "degraded": summary.degraded,
                "failed": summary.failed,
                "skipped": summary.skipped,
            },
            "timeline": &timeline,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    for (path, e) in &report.rejected {
        print_warning(&format!("Skipped {}: {}", path.display(), e));
    }

    print_heading("Imported Media");
    for file in catalog.list() {
        print_file(file);
    }

    print_section("Timeline");
    for track in timeline.tracks() {
        print_info(&track.name, format!("{} clip(s)", track.clips.len()));
        for clip in timeline.playback_order(&track.id) {
            println!(
                "    {:>7} - {:<7} {}",
                format_duration(clip.start_time),
                format_duration(clip.end_time()),
                clip.name
            );
        }
    }
    print_info("Total duration", format_duration(timeline.total_duration()));

    print_success(&format!(
        "{} ready, {} degraded, {} failed",
        summary.ready, summary.degraded, summary.failed
    ));
    Ok(())
}

fn print_file(file: &MediaFile) {
    print_section(&file.name);
    print_info("State", styled_state(file.processing_state));
    print_info("Size", format_file_size(file.size));
    if let Some(duration) = file.duration {
        print_info("Duration", format_duration(duration));
    }
    if let Some(resolution) = &file.resolution {
        print_info("Resolution", resolution);
    }
    if let Some(codec) = &file.codec {
        print_info("Codec", codec);
    }
    match (&file.thumbnail_path, &file.thumbnail_error) {
        (Some(path), _) => print_info("Thumbnail", path.display()),
        (None, Some(e)) => print_info("Thumbnail", format!("none ({e})")),
        (None, None) => {}
    }
    if let Some(error) = &file.error {
        print_info("Error", error);
    }
    if let Some(note) = &file.metadata_error {
        print_info("Note", note);
    }
}

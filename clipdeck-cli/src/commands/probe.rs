//! `clipdeck probe`: print the metadata of one file.

use std::sync::Arc;

use clipdeck_core::{
    CoreConfig, CoreResult, MediaProbe, VideoMetadata, format_duration, format_file_size,
};

use super::Services;
use crate::cli::ProbeArgs;
use crate::output::{print_heading, print_info, print_section, print_warning};

pub fn run_probe(config: CoreConfig, args: ProbeArgs) -> CoreResult<()> {
    let services = Services::start(config)?;
    let probe = MediaProbe::new(
        Arc::clone(&services.tool),
        Arc::clone(&services.monitor),
        &services.config,
    );

    let metadata = if args.no_fallback {
        probe.probe(&args.input)?
    } else {
        probe.probe_with_fallback(&args.input)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        print_metadata(&args.input.display().to_string(), &metadata);
    }
    Ok(())
}

fn print_metadata(name: &str, metadata: &VideoMetadata) {
    print_heading(name);
    print_info("Duration", format_duration(metadata.duration));
    print_info("Size", format_file_size(metadata.size));
    print_info("Bitrate", format!("{} bps", metadata.bitrate));

    print_section("Video");
    print_info("Codec", &metadata.video.codec);
    print_info("Resolution", metadata.resolution());
    print_info("Frame rate", format!("{:.3} fps", metadata.video.fps));

    print_section("Audio");
    match &metadata.audio {
        Some(audio) => {
            print_info("Codec", &audio.codec);
            print_info("Sample rate", format!("{} Hz", audio.sample_rate));
            print_info("Channels", audio.channels);
        }
        None => print_info("Audio", "none"),
    }

    if metadata.is_basic_metadata {
        let note = metadata
            .metadata_error
            .as_deref()
            .unwrap_or("basic metadata only");
        print_warning(note);
    }
}

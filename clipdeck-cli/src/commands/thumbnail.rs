//! `clipdeck thumbnail`: render one preview frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clipdeck_core::{CoreConfig, CoreResult, ThumbnailGenerator, ThumbnailOptions};
use clipdeck_core::media::thumbnail_path_for;

use super::Services;
use crate::cli::ThumbnailArgs;
use crate::output::print_success;

pub fn run_thumbnail(config: CoreConfig, args: ThumbnailArgs) -> CoreResult<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config, &args.input));
    let options = ThumbnailOptions {
        width: args.width,
        height: args.height,
        quality: args.quality,
    };

    let services = Services::start(config)?;
    let generator = ThumbnailGenerator::new(
        Arc::clone(&services.tool),
        Arc::clone(&services.monitor),
        &services.config,
    );

    let written = match args.offset {
        Some(offset) => generator.generate(&args.input, &output, offset, &options)?,
        None => generator.generate_with_fallback(&args.input, &output, &options)?,
    };

    print_success(&format!("Thumbnail written to {}", written.display()));
    Ok(())
}

// <temp-dir>/thumbnails/<file stem>.jpg
fn default_output(config: &CoreConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    thumbnail_path_for(&config.thumbnail_dir(), &stem)
}

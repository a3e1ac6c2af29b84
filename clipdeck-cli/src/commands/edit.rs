//! `clipdeck trim` and `clipdeck concat`: re-encode a span of one file, or
//! join several files end to end.

use std::sync::Arc;

use clipdeck_core::media::DEFAULT_CONCAT_FILE_NAME;
use clipdeck_core::{CoreConfig, CoreResult, EncodeSettings, MediaEditor};

use super::Services;
use crate::cli::{ConcatArgs, TrimArgs};
use crate::output::{print_info, print_success};

pub fn run_trim(config: CoreConfig, args: TrimArgs) -> CoreResult<()> {
    let services = Services::start(config)?;
    let editor = editor_for(&services);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| editor.trimmed_output_path(&args.input));

    let settings = EncodeSettings::with_quality(args.quality);
    let written = editor.trim(&args.input, &output, args.start, args.end, &settings)?;

    print_info("Span", format!("{}s - {}s", args.start, args.end));
    print_info("CRF", settings.quality.crf());
    print_success(&format!("Trimmed video written to {}", written.display()));
    Ok(())
}

pub fn run_concat(config: CoreConfig, args: ConcatArgs) -> CoreResult<()> {
    let services = Services::start(config)?;
    let editor = editor_for(&services);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| editor.concat_output_path(DEFAULT_CONCAT_FILE_NAME));

    let settings = EncodeSettings::with_quality(args.quality);
    let written = editor.concat(&args.inputs, &output, &settings)?;

    print_info("Inputs", args.inputs.len());
    print_success(&format!("Concatenated video written to {}", written.display()));
    Ok(())
}

fn editor_for(services: &Services) -> MediaEditor {
    MediaEditor::new(
        Arc::clone(&services.tool),
        Arc::clone(&services.monitor),
        &services.config,
    )
}

//! `clipdeck check`: report whether the media tools are usable.

use std::sync::Arc;

use clipdeck_core::{Availability, AvailabilityMonitor, CoreConfig, CoreError, CoreResult, FfmpegTool};
use log::info;

use crate::output::{print_heading, print_info, print_success};

/// Runs both availability checks in the foreground and prints the result.
///
/// Fails with `ToolUnavailable` so the exit status reflects the outcome.
pub fn run_check(config: CoreConfig) -> CoreResult<()> {
    config.validate()?;
    let tool = Arc::new(FfmpegTool::from_config(&config));
    let monitor = AvailabilityMonitor::new(tool, &config);

    print_heading("Media Tool Check");
    print_info("ffmpeg", config.ffmpeg_path.display());
    print_info("ffprobe", config.ffprobe_path.display());

    info!("Running fast availability check");
    let fast = monitor.check_fast();
    print_info("Version check", if fast { "passed" } else { "failed" });

    info!("Running full availability check");
    let full = monitor.check_full();
    print_info("Format listing", if full { "passed" } else { "failed" });

    match monitor.state() {
        Availability::Available => {
            print_success("FFmpeg is available");
            Ok(())
        }
        Availability::Unavailable | Availability::Unknown => Err(CoreError::ToolUnavailable),
    }
}

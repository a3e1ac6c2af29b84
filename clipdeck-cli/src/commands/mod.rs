//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of one subcommand. This module
//! is the composition root: it builds the tool and the availability monitor
//! that the commands share.

pub mod check;
pub mod edit;
pub mod import;
pub mod probe;
pub mod thumbnail;

use std::sync::Arc;
use std::thread::JoinHandle;

use clipdeck_core::{
    Availability, AvailabilityMonitor, CoreConfig, CoreResult, FfmpegTool, MediaTool,
};
use log::{debug, warn};

pub use check::run_check;
pub use edit::{run_concat, run_trim};
pub use import::run_import;
pub use probe::run_probe;
pub use thumbnail::run_thumbnail;

/// Shared collaborators for one CLI invocation.
pub struct Services {
    pub config: CoreConfig,
    pub tool: Arc<dyn MediaTool>,
    pub monitor: Arc<AvailabilityMonitor>,
    checks: Option<JoinHandle<Availability>>,
}

impl Services {
    /// Validates the configuration and starts the availability checks in the
    /// background. Tool calls wait for them through the monitor.
    pub fn start(config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        debug!(
            "Using ffmpeg at {}, ffprobe at {}, temp dir {}",
            config.ffmpeg_path.display(),
            config.ffprobe_path.display(),
            config.temp_dir.display()
        );

        let tool: Arc<dyn MediaTool> = Arc::new(FfmpegTool::from_config(&config));
        let monitor = Arc::new(AvailabilityMonitor::new(Arc::clone(&tool), &config));
        let checks = monitor.spawn_initialize();

        Ok(Self {
            config,
            tool,
            monitor,
            checks: Some(checks),
        })
    }
}

impl Drop for Services {
    // Joins the availability checks if they are done. A check still waiting
    // on a hung tool is left to end with the process.
    fn drop(&mut self) {
        let Some(checks) = self.checks.take() else {
            return;
        };
        if !checks.is_finished() {
            debug!("Availability checks still running at exit");
            return;
        }
        match checks.join() {
            Ok(state) => debug!("Availability checks resolved: {:?}", state),
            Err(_) => warn!("Availability check thread panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_core::{CoreConfigBuilder, CoreError};
    use tempfile::TempDir;

    #[test]
    fn test_start_keeps_availability_handle() {
        let temp = TempDir::new().unwrap();
        let config = CoreConfigBuilder::new()
            .ffmpeg_path("/nonexistent/clipdeck/ffmpeg")
            .ffprobe_path("/nonexistent/clipdeck/ffprobe")
            .temp_dir(temp.path().to_path_buf())
            .build();

        let mut services = Services::start(config).unwrap();
        assert!(matches!(services.monitor.require(), Err(CoreError::ToolUnavailable)));

        let checks = services.checks.take().unwrap();
        assert_eq!(checks.join().unwrap(), Availability::Unavailable);
    }
}

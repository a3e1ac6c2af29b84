// ============================================================================
// clipdeck-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the CLI
//
// Library code logs through the `log` facade only; this is the one place a
// backend is installed. The level defaults to info (debug with --verbose)
// and RUST_LOG, when set, takes precedence.
//
// USAGE:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug: Per-file pipeline stages and tool command lines
// - RUST_LOG=clipdeck_core=trace: Everything from the core library
//
// AI-ASSISTANT-INFO: Logger initialization for the CLI binary

use std::io::Write;

use log::LevelFilter;
use owo_colors::OwoColorize;

use crate::output::should_use_color;

/// Level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Safe to call once per process.
pub fn init(verbose: bool) {
    let color = should_use_color();

    env_logger::Builder::new()
        .filter_level(default_level(verbose))
        .parse_default_env()
        .format(move |buf, record| {
            let level = match record.level() {
                log::Level::Error => "ERROR",
                log::Level::Warn => "WARN ",
                log::Level::Info => "INFO ",
                log::Level::Debug => "DEBUG",
                log::Level::Trace => "TRACE",
            };
            if !color {
                return writeln!(buf, "{} {}", level, record.args());
            }
            match record.level() {
                log::Level::Error => writeln!(buf, "{} {}", level.bright_red(), record.args()),
                log::Level::Warn => writeln!(buf, "{} {}", level.yellow(), record.args()),
                log::Level::Info => writeln!(buf, "{} {}", level.green(), record.args()),
                log::Level::Debug => writeln!(buf, "{} {}", level.blue(), record.args()),
                log::Level::Trace => writeln!(buf, "{} {}", level.magenta(), record.args()),
            }
        })
        .init();

    log::debug!("Logger initialized (verbose: {})", verbose);
}

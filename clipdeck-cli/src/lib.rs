// clipdeck-cli/src/lib.rs
//
// Library portion of the Clipdeck CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{
    Cli, Commands, ConcatArgs, ImportArgs, ProbeArgs, ThumbnailArgs, ToolArgs, TrimArgs,
};
pub use commands::{run_check, run_concat, run_import, run_probe, run_thumbnail, run_trim};

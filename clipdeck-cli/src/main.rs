// ============================================================================
// clipdeck-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: Clipdeck command-line application
//
// Parses arguments, installs the logger, builds the core configuration from
// the global tool flags and dispatches to the selected command. Any error is
// printed once and turned into exit status 1.
//
// AI-ASSISTANT-INFO: Entry point for the clipdeck CLI application

use clap::Parser;
use clipdeck_cli::output::print_error;
use clipdeck_cli::{
    Cli, Commands, logging, run_check, run_concat, run_import, run_probe, run_thumbnail, run_trim,
};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.tools.core_config();
    let result = match cli.command {
        Commands::Check => run_check(config),
        Commands::Probe(args) => run_probe(config, args),
        Commands::Thumbnail(args) => run_thumbnail(config, args),
        Commands::Import(args) => run_import(config, args),
        Commands::Trim(args) => run_trim(config, args),
        Commands::Concat(args) => run_concat(config, args),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        process::exit(1);
    }
}

//! Terminal output helpers for the CLI.
//!
//! Results go to stdout; diagnostics go through `log`. Color is disabled
//! when `NO_COLOR` is set.

use std::fmt::Display;

use clipdeck_core::ProcessingState;
use owo_colors::OwoColorize;

/// Check if color should be used (respects NO_COLOR environment variable)
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a heading with clear separation
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);
    if should_use_color() {
        println!("\n{}", line.bright_blue());
        println!(" {}", text.bold());
        println!("{}", line.bright_blue());
    } else {
        println!("\n{line}\n {text}\n{line}");
    }
}

/// Print a section heading (smaller than main heading)
pub fn print_section(text: &str) {
    if should_use_color() {
        println!("\n{}", format!("----- {text} -----").cyan().bold());
    } else {
        println!("\n----- {text} -----");
    }
}

/// Print an aligned label/value line
pub fn print_info<T: Display>(label: &str, value: T) {
    let padded = format!("{label:<14}");
    if should_use_color() {
        println!("  {} {}", padded.bright_cyan(), value);
    } else {
        println!("  {padded} {value}");
    }
}

pub fn print_success(message: &str) {
    if should_use_color() {
        println!("{} {}", "[OK]".green().bold(), message);
    } else {
        println!("[OK] {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        println!("{} {}", "[WARN]".yellow().bold(), message);
    } else {
        println!("[WARN] {message}");
    }
}

/// Errors go to stderr so piped JSON output stays clean.
pub fn print_error(message: &str) {
    if should_use_color() {
        eprintln!("{} {}", "Error:".bright_red().bold(), message);
    } else {
        eprintln!("Error: {message}");
    }
}

/// Human label for a processing state.
pub fn state_label(state: ProcessingState) -> &'static str {
    match state {
        ProcessingState::Pending => "Pending",
        ProcessingState::Processing => "Processing",
        ProcessingState::Ready => "Ready",
        ProcessingState::Degraded => "Degraded",
        ProcessingState::Failed => "Failed",
    }
}

/// State label colored by severity.
pub fn styled_state(state: ProcessingState) -> String {
    let label = state_label(state);
    if !should_use_color() {
        return label.to_string();
    }
    match state {
        ProcessingState::Ready => label.green().to_string(),
        ProcessingState::Degraded => label.yellow().to_string(),
        ProcessingState::Failed => label.bright_red().to_string(),
        ProcessingState::Pending | ProcessingState::Processing => label.dimmed().to_string(),
    }
}

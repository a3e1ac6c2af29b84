//! Low-level helpers shared by the external tool integration.

pub mod command;

pub use command::{log_command, run_with_timeout};
pub(crate) use command::WAIT_POLL_INTERVAL;

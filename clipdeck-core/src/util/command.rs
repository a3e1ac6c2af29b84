//! Child process execution with a hard timeout.
//!
//! The external tool is untrusted with respect to latency: a malformed file can
//! make ffprobe hang indefinitely. Every invocation here races the process
//! against a deadline, and when the deadline wins the child is killed and
//! reaped so no handle is left behind.
//!
//! The pipe readers are only joined when the child exits on its own. A
//! wrapper script can leave a grandchild holding the pipes open after the
//! kill, so on timeout the readers are left to finish in the background.

use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{CoreError, CoreResult, command_start_error};

/// How often the wait loop checks whether the child has exited.
pub(crate) const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Logs a command line at debug level before it is spawned.
pub fn log_command(cmd: &Command) {
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    debug!(
        "Running command: {} {}",
        cmd.get_program().to_string_lossy(),
        args.join(" ")
    );
}

/// Runs `cmd` to completion or until `timeout` elapses.
///
/// Returns the captured output whatever the exit status; callers decide what a
/// non-zero status means. On timeout the child is killed and
/// `CoreError::Timeout` is returned with `label` as the operation name.
pub fn run_with_timeout(cmd: &mut Command, label: &str, timeout: Duration) -> CoreResult<Output> {
    log_command(cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_start_error(label, e))?;

    // Drain both pipes on their own threads so a chatty child cannot block
    // on a full pipe while we wait on it.
    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill_and_reap(&mut child, label);
                detach_reader(stdout_handle);
                detach_reader(stderr_handle);
                warn!("{} timed out after {:?}, process killed", label, timeout);
                return Err(CoreError::Timeout {
                    operation: label.to_string(),
                    after: timeout,
                });
            }
            Ok(None) => thread::sleep(WAIT_POLL_INTERVAL),
            Err(e) => {
                kill_and_reap(&mut child, label);
                detach_reader(stdout_handle);
                detach_reader(stderr_handle);
                return Err(CoreError::Io(e));
            }
        }
    };

    Ok(Output {
        status,
        stdout: join_reader(stdout_handle),
        stderr: join_reader(stderr_handle),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error just truncates what we captured.
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

// Dropping the handle detaches the thread; it exits when the last writer
// closes the pipe.
fn detach_reader(handle: Option<JoinHandle<Vec<u8>>>) {
    drop(handle);
}

fn kill_and_reap(child: &mut Child, label: &str) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill {} (may have already exited): {}", label, e);
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap {}: {}", label, e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_timeout_captures_output() {
        let mut cmd = Command::new("echo");
        cmd.arg("clipdeck");
        let output = run_with_timeout(&mut cmd, "echo", Duration::from_secs(5)).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "clipdeck");
    }

    #[test]
    fn test_run_with_timeout_kills_slow_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("10");
        let started = Instant::now();
        let result = run_with_timeout(&mut cmd, "sleep", Duration::from_millis(200));
        assert!(matches!(
            result,
            Err(CoreError::Timeout { ref operation, .. }) if operation == "sleep"
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_does_not_wait_for_grandchildren() {
        // The shell forks `sleep`, which inherits stdout and stderr and keeps
        // them open after the shell itself is killed.
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5; true"]);
        let started = Instant::now();
        let result = run_with_timeout(&mut cmd, "wrapper", Duration::from_millis(300));
        assert!(matches!(result, Err(CoreError::Timeout { after, .. }) if after == Duration::from_millis(300)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_run_with_timeout_missing_binary() {
        let mut cmd = Command::new("clipdeck-definitely-not-a-real-binary");
        let result = run_with_timeout(&mut cmd, "missing", Duration::from_secs(1));
        assert!(matches!(result, Err(CoreError::ToolUnavailable)));
    }

    #[test]
    fn test_run_with_timeout_reports_failure_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo oops >&2; exit 3"]);
        let output = run_with_timeout(&mut cmd, "sh", Duration::from_secs(5)).unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "oops");
    }
}

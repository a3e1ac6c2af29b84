// ============================================================================
// clipdeck-core/src/availability.rs
// ============================================================================
//
// AVAILABILITY MONITOR: Is the external media tool usable at all?
//
// Two independent checks feed one shared state. The fast check spawns
// `ffprobe -version` under a hard 5 second bound; the full check asks ffmpeg to
// list its formats and is authoritative once it has answered. The state starts
// out Unknown and callers never treat Unknown as Available: `require()` waits a
// bounded time and then fails with an explicit "not yet known" error.
//
// The monitor is an ordinary value owned by the composition root and shared by
// `Arc`; nothing here is global.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaTool;

/// Resolution state of the availability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    /// No check has answered yet.
    Unknown,
    Available,
    Unavailable,
}

#[derive(Debug)]
struct SharedState {
    state: Availability,
    /// A full check has been started and has not answered yet.
    full_pending: bool,
    /// Set once the full check has answered; later fast checks are ignored.
    full_resolved: bool,
    subscribers: Vec<Sender<Availability>>,
}

impl SharedState {
    /// Whether a caller may act on the current state. A negative fast check
    /// is provisional while the full check is still running.
    fn settled(&self) -> bool {
        match self.state {
            Availability::Available => true,
            Availability::Unavailable => !self.full_pending,
            Availability::Unknown => false,
        }
    }
}

/// Tracks whether the external media tool can be used.
pub struct AvailabilityMonitor {
    tool: Arc<dyn MediaTool>,
    shared: Mutex<SharedState>,
    changed: Condvar,
    fast_timeout: Duration,
    poll_interval: Duration,
    wait_bound: Duration,
}

impl AvailabilityMonitor {
    pub fn new(tool: Arc<dyn MediaTool>, config: &CoreConfig) -> Self {
        Self {
            tool,
            shared: Mutex::new(SharedState {
                state: Availability::Unknown,
                full_pending: false,
                full_resolved: false,
                subscribers: Vec::new(),
            }),
            changed: Condvar::new(),
            fast_timeout: config.availability_timeout,
            poll_interval: config.availability_poll_interval,
            wait_bound: config.availability_wait,
        }
    }

    /// Current state, without waiting.
    pub fn state(&self) -> Availability {
        self.lock().state
    }

    pub fn is_available(&self) -> bool {
        self.state() == Availability::Available
    }

    /// Returns a channel that receives every subsequent state transition.
    pub fn subscribe(&self) -> Receiver<Availability> {
        let (tx, rx) = mpsc::channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Runs the version check. Exit zero within the bound means available;
    /// a timeout or spawn failure means unavailable.
    pub fn check_fast(&self) -> bool {
        let available = match self.tool.version_check(self.fast_timeout) {
            Ok(ok) => ok,
            Err(e) => {
                warn!("Fast availability check failed: {}", e);
                false
            }
        };
        debug!("Fast availability check result: {}", available);
        self.set(available, false);
        available
    }

    /// Asks the tool to enumerate its formats. Any error, including a missing
    /// binary, means unavailable.
    pub fn check_full(&self) -> bool {
        self.lock().full_pending = true;
        let available = match self.tool.list_formats() {
            Ok(formats) => {
                debug!("Tool reports {} supported formats", formats.len());
                true
            }
            Err(e) => {
                warn!("Full availability check failed: {}", e);
                false
            }
        };
        self.set(available, true);
        available
    }

    /// Runs the fast check followed by the full check and returns the
    /// resolved state.
    pub fn initialize(&self) -> Availability {
        self.lock().full_pending = true;
        self.check_fast();
        self.check_full();
        let state = self.state();
        info!("Media tool availability: {:?}", state);
        state
    }

    /// Runs `initialize` on a background thread. Consumers can join the
    /// handle, or rely on `require()` waiting for the state to resolve.
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<Availability> {
        // Marked before the thread starts so an early `require()` waits for
        // the full check instead of acting on a provisional answer.
        self.lock().full_pending = true;
        let monitor = Arc::clone(self);
        thread::spawn(move || monitor.initialize())
    }

    /// Waits until the state is `Available` or `max_wait` elapses, then
    /// returns whether the tool is available.
    pub fn wait_for(&self, max_wait: Duration) -> bool {
        self.wait_until(max_wait, |shared| shared.state == Availability::Available)
            == Availability::Available
    }

    /// Gate applied before every tool call.
    ///
    /// Waits up to the configured bound for the state to settle: `Unknown`,
    /// or a negative fast answer while the full check is still running, is
    /// not acted on. Then fails fast with `ToolUnavailable` or
    /// `AvailabilityUnknown`.
    pub fn require(&self) -> CoreResult<()> {
        let state = self.wait_until(self.wait_bound, SharedState::settled);
        match state {
            Availability::Available => Ok(()),
            Availability::Unavailable if !self.lock().full_pending => {
                Err(CoreError::ToolUnavailable)
            }
            Availability::Unavailable | Availability::Unknown => {
                Err(CoreError::AvailabilityUnknown)
            }
        }
    }

    // Blocks on the condition variable; every transition wakes the waiters.
    // The poll interval caps each wait so a missed wakeup costs one interval.
    fn wait_until(
        &self,
        max_wait: Duration,
        done: impl Fn(&SharedState) -> bool,
    ) -> Availability {
        let deadline = Instant::now() + max_wait;
        let mut shared = self.lock();
        loop {
            if done(&shared) {
                return shared.state;
            }
            let now = Instant::now();
            if now >= deadline {
                return shared.state;
            }
            let slice = self.poll_interval.min(deadline - now);
            shared = match self.changed.wait_timeout(shared, slice) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    fn set(&self, available: bool, authoritative: bool) {
        let new_state = if available {
            Availability::Available
        } else {
            Availability::Unavailable
        };

        let mut shared = self.lock();
        if !authoritative && shared.full_resolved {
            debug!("Ignoring fast check result; full check already resolved");
            return;
        }
        if authoritative {
            shared.full_resolved = true;
            shared.full_pending = false;
        }
        if shared.state != new_state {
            shared.state = new_state;
            shared.subscribers.retain(|tx| tx.send(new_state).is_ok());
        }
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

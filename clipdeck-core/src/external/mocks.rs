// clipdeck-core/src/external/mocks.rs

// --- Scripted MediaTool (for testing) ---

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::{ConcatRequest, MediaTool, ProbeMode, RawProbe, RenderRequest, TrimRequest};
use crate::error::{CoreError, CoreResult, classify_probe_failure};

/// One recorded interaction with the tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Probe { path: PathBuf, mode: ProbeMode },
    Render {
        input: PathBuf,
        output: PathBuf,
        seek: f64,
        timeout: Duration,
    },
    Trim {
        input: PathBuf,
        output: PathBuf,
        start: f64,
        duration: f64,
        crf: u8,
        timeout: Duration,
    },
    Concat {
        inputs: Vec<PathBuf>,
        output: PathBuf,
        crf: u8,
        timeout: Duration,
    },
    ListFormats,
    VersionCheck { timeout: Duration },
}

/// Scripted answer to a probe call.
#[derive(Debug, Clone)]
pub enum ProbeScript {
    /// ffprobe succeeded with this JSON on stdout.
    Json(String),
    /// ffprobe failed with this message on stderr.
    Fail(String),
    /// The probe hit its deadline.
    Timeout,
}

/// Scripted answer to a version check or format listing.
#[derive(Debug, Clone)]
pub enum CheckScript {
    Succeed,
    /// Ran but exited non-zero.
    Fail,
    /// Binary is missing.
    Missing,
    Timeout,
}

type ProbeHook = Box<dyn Fn(&Path, ProbeMode) + Send + Sync>;

/// In-process stand-in for ffmpeg/ffprobe.
///
/// Unscripted probes fail; renders, encodes and availability checks succeed.
/// Successful renders and encodes write a placeholder output file.
#[derive(Default)]
pub struct ScriptedTool {
    probes: Mutex<HashMap<ProbeMode, ProbeScript>>,
    probes_by_path: Mutex<HashMap<(PathBuf, ProbeMode), ProbeScript>>,
    probe_hook: Mutex<Option<ProbeHook>>,
    failing_offsets: Mutex<Vec<(f64, String)>>,
    render_fails_always: Mutex<Option<String>>,
    encode_failure: Mutex<Option<String>>,
    version: Mutex<Option<(CheckScript, Duration)>>,
    formats: Mutex<Option<(CheckScript, Duration)>>,
    calls: Mutex<Vec<ToolCall>>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every probe in `mode` with `script`.
    pub fn on_probe(&self, mode: ProbeMode, script: ProbeScript) -> &Self {
        lock(&self.probes).insert(mode, script);
        self
    }

    /// Answers probes of one file in `mode` with `script`; takes precedence
    /// over `on_probe`.
    pub fn on_probe_of(&self, path: &Path, mode: ProbeMode, script: ProbeScript) -> &Self {
        lock(&self.probes_by_path).insert((path.to_path_buf(), mode), script);
        self
    }

    /// Runs `hook` at the start of every probe, before the answer is produced.
    pub fn on_probe_call(&self, hook: impl Fn(&Path, ProbeMode) + Send + Sync + 'static) -> &Self {
        *lock(&self.probe_hook) = Some(Box::new(hook));
        self
    }

    /// Makes renders at `seek` fail with `message`.
    pub fn fail_render_at(&self, seek: f64, message: &str) -> &Self {
        lock(&self.failing_offsets).push((seek, message.to_string()));
        self
    }

    /// Makes every render fail with `message`.
    pub fn fail_all_renders(&self, message: &str) -> &Self {
        *lock(&self.render_fails_always) = Some(message.to_string());
        self
    }

    /// Makes every trim and concat fail with `message`.
    pub fn fail_encodes(&self, message: &str) -> &Self {
        *lock(&self.encode_failure) = Some(message.to_string());
        self
    }

    /// Scripts the version check, answering after `delay`.
    pub fn on_version_check(&self, script: CheckScript, delay: Duration) -> &Self {
        *lock(&self.version) = Some((script, delay));
        self
    }

    /// Scripts the format listing, answering after `delay`.
    pub fn on_list_formats(&self, script: CheckScript, delay: Duration) -> &Self {
        *lock(&self.formats) = Some((script, delay));
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ToolCall> {
        lock(&self.calls).clone()
    }

    /// Seek offsets of every render received so far, in order.
    pub fn render_offsets(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCall::Render { seek, .. } => Some(seek),
                _ => None,
            })
            .collect()
    }

    /// Number of probe calls received so far.
    pub fn probe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ToolCall::Probe { .. }))
            .count()
    }

    fn record(&self, call: ToolCall) {
        lock(&self.calls).push(call);
    }
}

impl MediaTool for ScriptedTool {
    fn probe(&self, path: &Path, mode: ProbeMode, timeout: Duration) -> CoreResult<RawProbe> {
        self.record(ToolCall::Probe {
            path: path.to_path_buf(),
            mode,
        });
        if let Some(hook) = lock(&self.probe_hook).as_ref() {
            hook(path, mode);
        }

        let script = lock(&self.probes_by_path)
            .get(&(path.to_path_buf(), mode))
            .cloned()
            .or_else(|| lock(&self.probes).get(&mode).cloned());

        match script {
            Some(ProbeScript::Json(json)) => Ok(RawProbe::from_json(json.as_bytes())?),
            Some(ProbeScript::Fail(stderr)) => Err(classify_probe_failure(path, &stderr)),
            Some(ProbeScript::Timeout) => Err(CoreError::Timeout {
                operation: "ffprobe".to_string(),
                after: timeout,
            }),
            None => Err(CoreError::ProbeFailed("no scripted probe response".to_string())),
        }
    }

    fn render(&self, request: &RenderRequest, timeout: Duration) -> CoreResult<()> {
        self.record(ToolCall::Render {
            input: request.input.clone(),
            output: request.output.clone(),
            seek: request.seek,
            timeout,
        });

        if let Some(message) = lock(&self.render_fails_always).clone() {
            return Err(CoreError::ThumbnailFailed(message));
        }
        let failure = lock(&self.failing_offsets)
            .iter()
            .find(|(seek, _)| (*seek - request.seek).abs() < f64::EPSILON)
            .map(|(_, message)| message.clone());
        if let Some(message) = failure {
            return Err(CoreError::ThumbnailFailed(message));
        }

        fs::write(&request.output, b"\xFF\xD8\xFF\xD9")?;
        Ok(())
    }

    fn trim(&self, request: &TrimRequest, timeout: Duration) -> CoreResult<()> {
        self.record(ToolCall::Trim {
            input: request.input.clone(),
            output: request.output.clone(),
            start: request.start,
            duration: request.duration,
            crf: request.settings.quality.crf(),
            timeout,
        });
        if let Some(message) = lock(&self.encode_failure).clone() {
            return Err(CoreError::TrimFailed(message));
        }
        fs::write(&request.output, b"trimmed")?;
        Ok(())
    }

    fn concat(&self, request: &ConcatRequest, timeout: Duration) -> CoreResult<()> {
        self.record(ToolCall::Concat {
            inputs: request.inputs.clone(),
            output: request.output.clone(),
            crf: request.settings.quality.crf(),
            timeout,
        });
        if let Some(message) = lock(&self.encode_failure).clone() {
            return Err(CoreError::ConcatFailed(message));
        }
        fs::write(&request.output, b"concatenated")?;
        Ok(())
    }

    fn list_formats(&self) -> CoreResult<Vec<String>> {
        self.record(ToolCall::ListFormats);
        let scripted = lock(&self.formats).clone();
        let (script, delay) = scripted.unwrap_or((CheckScript::Succeed, Duration::ZERO));
        thread::sleep(delay);
        match script {
            CheckScript::Succeed => Ok(vec!["mp4".to_string(), "matroska,webm".to_string()]),
            CheckScript::Fail => Err(CoreError::ProbeFailed("ffmpeg -formats failed".to_string())),
            CheckScript::Missing => Err(CoreError::ToolUnavailable),
            CheckScript::Timeout => Err(CoreError::Timeout {
                operation: "ffmpeg (formats)".to_string(),
                after: delay,
            }),
        }
    }

    fn version_check(&self, timeout: Duration) -> CoreResult<bool> {
        self.record(ToolCall::VersionCheck { timeout });
        let scripted = lock(&self.version).clone();
        let (script, delay) = scripted.unwrap_or((CheckScript::Succeed, Duration::ZERO));
        thread::sleep(delay);
        match script {
            CheckScript::Succeed => Ok(true),
            CheckScript::Fail => Ok(false),
            CheckScript::Missing => Err(CoreError::ToolUnavailable),
            CheckScript::Timeout => Err(CoreError::Timeout {
                operation: "ffprobe -version".to_string(),
                after: timeout,
            }),
        }
    }
}

// A panicking test thread poisons the lock; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

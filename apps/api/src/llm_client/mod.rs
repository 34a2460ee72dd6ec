//! Generation Client — the single point of entry for local model calls.
//!
//! Every request runs the configured executable once (`<binary> run <model>`)
//! with the prompt on stdin, under a hard wall-clock timeout. The model is
//! told to wrap its answer in a START/END marker pair and the answer is cut
//! out from the LAST occurrence of each marker, so an echoed copy of the
//! instructions earlier in the output is skipped.
//!
//! Failures never propagate: callers always get a display string, with
//! errors prefixed by `[AI System Message]`. No retries.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub mod prompts;

use prompts::{wrap_prompt, ANALYSIS_END, ANALYSIS_START, QUESTIONS_END, QUESTIONS_START};

pub const DEFAULT_BINARY: &str = "ollama";
pub const DEFAULT_MODEL: &str = "qwen2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
/// Characters of raw output kept when the markers cannot be found.
pub const RAW_OUTPUT_LIMIT: usize = 1000;
pub const SYSTEM_MESSAGE_PREFIX: &str = "[AI System Message]";
pub const RAW_OUTPUT_PREFIX: &str = "[Raw Output]";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{binary} executable not found. Please install it and ensure it is in PATH.")]
    ExecutableNotFound { binary: String },

    #[error("Model '{model}' not found. Run: {binary} pull {model}")]
    ModelNotFound { binary: String, model: String },

    #[error("{binary} error (code {}): {stderr}", display_code(.exit_code))]
    ProcessFailed {
        binary: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{binary} returned empty output.")]
    EmptyOutput { binary: String },

    #[error("Timeout: model exceeded {secs} seconds.")]
    Timeout { secs: f64 },

    #[error("System error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "terminated by signal".to_string())
}

/// Which task a request serves. Each kind has its own marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Analysis,
    Questions,
}

impl GenerationKind {
    pub fn markers(self) -> (&'static str, &'static str) {
        match self {
            Self::Analysis => (ANALYSIS_START, ANALYSIS_END),
            Self::Questions => (QUESTIONS_START, QUESTIONS_END),
        }
    }
}

/// Result of one process run: raw stdout on success, or a failure description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    Failure(String),
}

impl From<Result<String, GenerationError>> for GenerationOutcome {
    fn from(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(raw) => Self::Success(raw),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

impl GenerationOutcome {
    /// Turns the outcome into the string shown to users: the marker-delimited
    /// answer, a truncated raw fallback, or a prefixed system message.
    pub fn render(&self, kind: GenerationKind) -> String {
        match self {
            Self::Failure(message) => format!("{SYSTEM_MESSAGE_PREFIX} {message}"),
            Self::Success(raw) => {
                let (start, end) = kind.markers();
                match extract_between_markers(raw, start, end).filter(|s| !s.is_empty()) {
                    Some(answer) => answer.to_string(),
                    None => format!("{RAW_OUTPUT_PREFIX}\n{}", truncate_chars(raw, RAW_OUTPUT_LIMIT)),
                }
            }
        }
    }
}

/// Returns the trimmed text strictly between the last `start` and the last `end`.
///
/// `None` when either marker is missing or the last `end` does not come after
/// the last `start`. Marker text inside a legitimate answer is not escaped.
pub fn extract_between_markers<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let start_idx = text.rfind(start)?;
    let end_idx = text.rfind(end)?;
    let content_start = start_idx + start.len();
    if end_idx < content_start {
        return None;
    }
    Some(text[content_start..end_idx].trim())
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Settings for the generation process. Passed explicitly into the client.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Executable name (resolved on PATH) or path.
    pub binary: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    /// Reads `OLLAMA_BINARY`, `OLLAMA_MODEL` and `OLLAMA_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(binary) = non_blank("OLLAMA_BINARY") {
            config = config.with_binary(binary);
        }
        if let Some(model) = non_blank("OLLAMA_MODEL") {
            config = config.with_model(model);
        }
        if let Some(v) = non_blank("OLLAMA_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_timeout(Duration::from_secs(secs)),
                _ => warn!(
                    value = %v,
                    default = DEFAULT_TIMEOUT_SECS,
                    "Invalid OLLAMA_TIMEOUT_SECS value, using default"
                ),
            }
        }
        config
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait seam
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can answer a generation request with a display string.
///
/// The analysis pipeline holds a `&dyn TextGenerator`, so tests can swap in
/// fakes without spawning processes.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Never fails: errors come back as `[AI System Message] ...` strings.
    async fn generate(&self, kind: GenerationKind, prompt: &str) -> String;

    fn model(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Process-backed client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenerationClient {
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Resolves the executable on PATH (or as a path when it contains a separator).
    pub fn executable_path(&self) -> Option<PathBuf> {
        which::which(&self.config.binary).ok()
    }

    pub fn is_available(&self) -> bool {
        self.executable_path().is_some()
    }

    /// Runs the model once and returns its trimmed stdout.
    ///
    /// The child is killed if the timeout elapses before it exits.
    pub async fn run(&self, prompt: &str) -> Result<String, GenerationError> {
        let binary = self.config.binary.clone();
        let path = self
            .executable_path()
            .ok_or_else(|| GenerationError::ExecutableNotFound {
                binary: binary.clone(),
            })?;

        debug!(
            binary = %binary,
            model = %self.config.model,
            timeout_secs = self.config.timeout.as_secs_f64(),
            prompt_chars = prompt.len(),
            "Spawning generation process"
        );

        let mut child = Command::new(&path)
            .arg("run")
            .arg(&self.config.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take();
        let exchange = async move {
            let write = async move {
                let Some(mut stdin) = stdin else {
                    return Ok(());
                };
                match stdin.write_all(prompt.as_bytes()).await {
                    // The child may exit without reading its input.
                    Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            };
            let (written, output) = tokio::join!(write, child.wait_with_output());
            written?;
            output
        };

        let output = match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(
                    binary = %binary,
                    timeout_secs = self.config.timeout.as_secs_f64(),
                    "Generation process timed out and was killed"
                );
                return Err(GenerationError::Timeout {
                    secs: self.config.timeout.as_secs_f64(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lowered = stderr.to_lowercase();
            warn!(
                binary = %binary,
                exit_code = ?output.status.code(),
                "Generation process failed"
            );
            if lowered.contains("pull") || lowered.contains("not found") {
                return Err(GenerationError::ModelNotFound {
                    binary,
                    model: self.config.model.clone(),
                });
            }
            return Err(GenerationError::ProcessFailed {
                binary,
                exit_code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(GenerationError::EmptyOutput { binary });
        }

        debug!(output_chars = stdout.len(), "Generation process succeeded");
        Ok(stdout)
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn generate(&self, kind: GenerationKind, prompt: &str) -> String {
        let (start, end) = kind.markers();
        let wrapped = wrap_prompt(prompt, start, end);

        info!(kind = ?kind, model = %self.config.model, "Requesting generation");
        let outcome = GenerationOutcome::from(self.run(&wrapped).await);
        outcome.render(kind)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

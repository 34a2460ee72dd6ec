//! Result persistence — one pretty-printed JSON file per candidate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes analysis results under a fixed directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    results_dir: PathBuf,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Path for a candidate's aggregated results file.
    pub fn result_path(&self, candidate_name: &str, source_name: &str, timestamp: i64) -> PathBuf {
        self.results_dir
            .join(result_file_name(candidate_name, source_name, timestamp))
    }

    /// Serializes `records` as pretty JSON at `path`, creating parent directories.
    pub async fn save_results<T: Serialize + ?Sized>(
        &self,
        records: &T,
        path: &Path,
    ) -> Result<PathBuf, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let body = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(path, body)
            .await
            .map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), "Saved analysis results");
        Ok(path.to_path_buf())
    }
}

/// Loads a JSON document, returning `default` when the file is missing or invalid.
pub async fn load_json(path: &Path, default: Value) -> Value {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Could not read JSON file");
            }
            return default;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "File contains invalid JSON");
            default
        }
    }
}

/// `<candidate>_<source>_<timestamp>_analysis.json`.
///
/// Candidate names containing "unknown" collapse to `resume`; the source is
/// reduced to its final path component and a trailing `.txt` is dropped.
/// Both come from client input, so the result is always a single path
/// component with no separators.
pub fn result_file_name(candidate_name: &str, source_name: &str, timestamp: i64) -> String {
    let mut candidate = slug(candidate_name);
    if candidate.contains("unknown") {
        candidate = "resume".to_string();
    }
    let base = Path::new(source_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source_name);
    let source = slug(&base.replace(".txt", ""));
    format!("{candidate}_{source}_{timestamp}_analysis.json")
}

/// Lower-cases and keeps letters, digits, `-` and `.`; everything else
/// (spaces, separators, control characters) becomes `_`.
fn slug(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

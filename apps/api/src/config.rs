use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::GenerationConfig;

/// Application configuration loaded from environment variables.
/// Every setting has a default; only a malformed `PORT` is an error.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory receiving one results file per analyzed candidate.
    pub results_dir: PathBuf,
    /// Job description served as the starting point for new analyses.
    pub default_job_path: PathBuf,
    pub generation: GenerationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            results_dir: PathBuf::from(env_or("RESULTS_DIR", "data/results")),
            default_job_path: PathBuf::from(env_or(
                "DEFAULT_JOB_PATH",
                "data/job_description.json",
            )),
            generation: GenerationConfig::from_env(),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

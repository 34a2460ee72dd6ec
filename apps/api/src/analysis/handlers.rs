use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::analysis::pipeline::{analyze_batch, AiOptions, CandidateOutcome, ResumeInput};
use crate::errors::AppError;
use crate::models::job::{jobs_from_value, parse_job_payload, JobRequirement};
use crate::state::AppState;
use crate::storage::load_json;

const MISSING_RESUMES: &str = "Please upload at least one resume.";
const MISSING_JOB: &str = "Please provide a job description (paste or upload).";

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResumeText {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// A job object, an array of jobs, or the same as raw JSON text.
    #[serde(default)]
    pub job: Value,
    #[serde(default)]
    pub resumes: Vec<ResumeText>,
    #[serde(default)]
    pub use_ai_explanation: bool,
    #[serde(default)]
    pub use_ai_questions: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub jobs: Vec<JobRequirement>,
    pub candidates: Vec<CandidateOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub ai_available: bool,
    pub model: String,
    pub binary: String,
    pub timeout_secs: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct AiToggles {
    explain: bool,
    questions: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if req.resumes.is_empty() {
        return Err(AppError::Validation(MISSING_RESUMES.into()));
    }

    let jobs = match &req.job {
        Value::Null => return Err(AppError::Validation(MISSING_JOB.into())),
        Value::String(text) if text.trim().is_empty() => {
            return Err(AppError::Validation(MISSING_JOB.into()))
        }
        Value::String(text) => parse_job_payload(text)?,
        other => jobs_from_value(other)?,
    };

    let resumes = req
        .resumes
        .into_iter()
        .map(|r| ResumeInput::new(r.file_name, r.content))
        .collect();
    let toggles = AiToggles {
        explain: req.use_ai_explanation,
        questions: req.use_ai_questions,
    };

    Ok(Json(run_analysis(&state, jobs, resumes, toggles).await))
}

/// POST /api/v1/analyze/upload
///
/// Multipart form: `job_file` (takes precedence) or `job_json`, repeated
/// `resume` parts, and the two AI toggles.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut job_file: Option<Vec<u8>> = None;
    let mut job_text: Option<String> = None;
    let mut resumes = Vec::new();
    let mut toggles = AiToggles::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_file" => {
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    job_file = Some(bytes.to_vec());
                }
            }
            "job_json" => job_text = Some(field.text().await.map_err(bad_multipart)?),
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume.txt").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                resumes.push(ResumeInput::new(file_name, bytes.to_vec()));
            }
            "use_ai_explanation" => {
                toggles.explain = is_checked(&field.text().await.map_err(bad_multipart)?)
            }
            "use_ai_questions" => {
                toggles.questions = is_checked(&field.text().await.map_err(bad_multipart)?)
            }
            other => warn!(field = other, "Ignoring unexpected multipart field"),
        }
    }

    if resumes.is_empty() {
        return Err(AppError::Validation(MISSING_RESUMES.into()));
    }

    let jobs = match (job_file, job_text) {
        (Some(bytes), _) => {
            let text = String::from_utf8_lossy(&bytes);
            parse_job_payload(&text)?
        }
        (None, Some(text)) if !text.trim().is_empty() => parse_job_payload(&text)?,
        _ => return Err(AppError::Validation(MISSING_JOB.into())),
    };

    Ok(Json(run_analysis(&state, jobs, resumes, toggles).await))
}

/// GET /api/v1/capabilities
pub async fn handle_capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    let generation = &state.config.generation;
    Json(CapabilitiesResponse {
        ai_available: state.ai_available(),
        model: generation.model.clone(),
        binary: generation.binary.clone(),
        timeout_secs: generation.timeout.as_secs_f64(),
    })
}

/// GET /api/v1/jobs/default
pub async fn handle_default_job(State(state): State<AppState>) -> Json<Value> {
    Json(load_json(&state.config.default_job_path, json!({})).await)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_analysis(
    state: &AppState,
    jobs: Vec<JobRequirement>,
    resumes: Vec<ResumeInput>,
    toggles: AiToggles,
) -> AnalyzeResponse {
    let wants_ai = toggles.explain || toggles.questions;
    let (ai, ai_notice) = match (&state.generator, wants_ai) {
        (Some(generator), true) => (
            Some(AiOptions {
                generator: generator.as_ref(),
                explain: toggles.explain,
                questions: toggles.questions,
            }),
            None,
        ),
        (None, true) => (
            None,
            Some(format!(
                "{} not found! AI features will be disabled.",
                state.config.generation.binary
            )),
        ),
        _ => (None, None),
    };

    info!(
        resumes = resumes.len(),
        jobs = jobs.len(),
        ai = ai.is_some(),
        "Starting batch analysis"
    );

    let candidates = analyze_batch(resumes, &jobs, ai.as_ref(), &state.store).await;

    AnalyzeResponse {
        jobs,
        candidates,
        ai_notice,
    }
}

fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

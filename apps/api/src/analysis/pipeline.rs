//! Batch analysis — orchestrates parse → match → report → (optional) generation → persist.
//!
//! Résumés are processed one after another. A résumé that cannot be decoded
//! is reported as failed and the batch moves on; a failed save is logged and
//! surfaces as `saved_to: None`. Neither aborts the remaining work.

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::matcher::match_candidate;
use crate::analysis::prompts::{analysis_prompt, interview_questions_prompt};
use crate::analysis::reporter::{generate_report, ReportOutput};
use crate::analysis::resume_parser::parse_resume;
use crate::llm_client::{GenerationKind, TextGenerator};
use crate::models::job::JobRequirement;
use crate::models::profile::Profile;
use crate::storage::ResultStore;

/// One uploaded résumé, still undecoded.
#[derive(Debug, Clone)]
pub struct ResumeInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeInput {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Which generation tasks to run, and with what.
pub struct AiOptions<'a> {
    pub generator: &'a dyn TextGenerator,
    pub explain: bool,
    pub questions: bool,
}

impl AiOptions<'_> {
    fn is_active(&self) -> bool {
        self.explain || self.questions
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateAnalysis {
    pub file_name: String,
    pub candidate: Profile,
    pub reports: Vec<ReportOutput>,
    /// Where the aggregated results were written, if saving succeeded.
    pub saved_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Analyzed(CandidateAnalysis),
    Failed { file_name: String, error: String },
}

/// Analyzes every résumé against every job, in input order.
pub async fn analyze_batch(
    resumes: Vec<ResumeInput>,
    jobs: &[JobRequirement],
    ai: Option<&AiOptions<'_>>,
    store: &ResultStore,
) -> Vec<CandidateOutcome> {
    let mut outcomes = Vec::with_capacity(resumes.len());

    for resume in resumes {
        let ResumeInput { file_name, bytes } = resume;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file_name, error = %e, "Skipping undecodable resume");
                outcomes.push(CandidateOutcome::Failed {
                    error: format!("Error reading {file_name}: {e}"),
                    file_name,
                });
                continue;
            }
        };

        let candidate = parse_resume(&text);
        let reports = analyze_candidate(&candidate, jobs, ai).await;

        let path = store.result_path(
            &candidate.name,
            &file_name,
            chrono::Utc::now().timestamp(),
        );
        let records: Vec<_> = reports.iter().map(|r| &r.data).collect();
        let saved_to = match store.save_results(&records, &path).await {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to save analysis results");
                None
            }
        };

        outcomes.push(CandidateOutcome::Analyzed(CandidateAnalysis {
            file_name,
            candidate,
            reports,
            saved_to,
        }));
    }

    outcomes
}

/// Scores one candidate against each job and attaches any requested generation output.
pub async fn analyze_candidate(
    candidate: &Profile,
    jobs: &[JobRequirement],
    ai: Option<&AiOptions<'_>>,
) -> Vec<ReportOutput> {
    let mut reports = Vec::with_capacity(jobs.len());

    for job in jobs {
        let result = match_candidate(candidate, job);
        let mut report = generate_report(candidate, job, result.score, &result.matched_skills);

        info!(
            candidate = %candidate.name,
            job = %job.title,
            score = result.score,
            recommendation = %report.data.recommendation,
            "Candidate scored"
        );

        if let Some(ai) = ai.filter(|ai| ai.is_active()) {
            if ai.explain {
                let prompt = analysis_prompt(candidate, job, &report.data);
                report.data.ai_explanation =
                    Some(ai.generator.generate(GenerationKind::Analysis, &prompt).await);
            }
            if ai.questions {
                let prompt = interview_questions_prompt(candidate, job, &report.data);
                report.data.ai_interview_questions =
                    Some(ai.generator.generate(GenerationKind::Questions, &prompt).await);
            }
        }

        reports.push(report);
    }

    reports
}

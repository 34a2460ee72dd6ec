//! Reporter — turns a score and matched skills into a [`Report`] plus a text summary.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::job::JobRequirement;
use crate::models::profile::Profile;
use crate::models::report::{Recommendation, Report};

/// Human-readable report paired with its structured form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub text: String,
    pub data: Report,
}

pub fn generate_report(
    profile: &Profile,
    job: &JobRequirement,
    score: f64,
    matched_skills: &HashSet<String>,
) -> ReportOutput {
    let mut sorted: Vec<String> = matched_skills.iter().cloned().collect();
    sorted.sort();

    let recommendation = Recommendation::from_score(score);
    let text = render_text(&profile.name, &job.title, score, recommendation, &sorted);

    let data = Report {
        candidate_name: profile.name.clone(),
        email: profile.email.clone(),
        education: profile.education.clone(),
        experience_years: profile.experience,
        job_title: job.title.clone(),
        match_score: score,
        matched_skills: sorted,
        recommendation,
        ai_explanation: None,
        ai_interview_questions: None,
    };

    ReportOutput { text, data }
}

fn render_text(
    name: &str,
    title: &str,
    score: f64,
    recommendation: Recommendation,
    skills: &[String],
) -> String {
    let skills_text = if skills.is_empty() {
        "None".to_string()
    } else {
        skills.join(", ")
    };

    format!(
        "CANDIDATE ANALYSIS REPORT\n\
         Name:       {name}\n\
         Role:       {title}\n\
         Score:      {score:.1}/100\n\
         Status:     {recommendation}\n\
         \n\
         Matched Skills: {skills_text}\n"
    )
}

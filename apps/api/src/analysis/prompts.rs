// Prompt templates for the two generation tasks run on top of a report.
// The START/END marker instruction is appended later by llm_client.
//
// Placeholders are filled in a single pass, so values that happen to contain
// `{...}` text are inserted literally.

use std::collections::BTreeSet;

use crate::models::job::JobRequirement;
use crate::models::profile::Profile;
use crate::models::report::Report;

/// Maximum number of missing skills named as the interview focus.
const FOCUS_SKILL_LIMIT: usize = 2;

/// Qualitative insight prompt.
/// Replace: {job_title}, {required_skills}, {candidate_skills}, {matched_skills},
///          {experience}, {score}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"### SYSTEM ROLE
You are a Senior Talent Analyst.
Your job is to interpret data, not just repeat it.
You do NOT make hiring decisions or change scores.

### TRUTH DATA (USE VERBATIM)
- Job Title: {job_title}
- Required Skills: {required_skills}
- Candidate Skills: {candidate_skills}
- Matched Skills: {matched_skills}
- Experience: {experience} years
- Calculated Score: {score}/100

### TASK
Provide 3 qualitative insights about this match.

### STRICT OUTPUT FORMAT
===BEGIN ANALYSIS===
Insight 1: [Analyze the balance of skills vs experience]
Insight 2: [Identify a specific risk or growth area]
Insight 3: [Comment on team fit potential based on skills]
===END ANALYSIS===

### NEGATIVE CONSTRAINTS
- Do NOT recommend hire/reject.
- Do NOT explain or restate the math or value of the score.
- Do NOT invent skills, experience, or personality traits.
- Team fit comments must be based ONLY on skill overlap."#;

/// Interview question prompt.
/// Replace: {job_title}, {score}, {focus_area}, {experience}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"### SYSTEM ROLE
You are a Principal Engineer conducting a technical deep-dive.
Your goal is to expose surface-level knowledge vs deep understanding.

### TRUTH DATA (USE VERBATIM)
- Role: {job_title}
- Match Score: {score}
- Missing / Weak Areas: {focus_area}
- Experience: {experience} years

### TASK
Generate exactly 3 probing interview questions.

### STRICT OUTPUT FORMAT
===BEGIN QUESTIONS===
1. [Conceptual Depth]: Test understanding of {focus_area}.
2. [Scenario]: A real-world production failure or debugging situation.
3. [Trade-off]: A decision requiring judgment (e.g., speed vs reliability).
===END QUESTIONS===

### NEGATIVE CONSTRAINTS
- Do NOT ask generic "What is X?" questions.
- Do NOT provide answers.
- Do NOT introduce new skills or assumptions.
- Do NOT invent facts about the candidate or make hiring decisions.
- Do NOT restate the match score.
- Do NOT be polite or verbose. Just list the questions."#;

pub fn analysis_prompt(profile: &Profile, job: &JobRequirement, report: &Report) -> String {
    let candidate_skills = join_or(&profile.skills, "None listed");
    let matched_skills = join_or(&report.matched_skills, "None");
    let required_skills = job.required_skills.join(", ");
    let experience = profile.experience.to_string();
    let score = format!("{:.1}", report.match_score);

    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.as_str()),
            ("required_skills", required_skills.as_str()),
            ("candidate_skills", candidate_skills.as_str()),
            ("matched_skills", matched_skills.as_str()),
            ("experience", experience.as_str()),
            ("score", score.as_str()),
        ],
    )
}

pub fn interview_questions_prompt(
    profile: &Profile,
    job: &JobRequirement,
    report: &Report,
) -> String {
    let focus_area = focus_area(profile, job);
    let experience = profile.experience.to_string();
    let score = format!("{:.1}", report.match_score);

    fill_template(
        QUESTIONS_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.as_str()),
            ("score", score.as_str()),
            ("focus_area", focus_area.as_str()),
            ("experience", experience.as_str()),
        ],
    )
}

/// Up to two required skills the candidate lacks, alphabetically, or a
/// role-level fallback when nothing is missing.
pub fn focus_area(profile: &Profile, job: &JobRequirement) -> String {
    let candidate: BTreeSet<String> = profile.skills.iter().map(|s| s.to_lowercase()).collect();
    let missing: Vec<String> = job
        .skill_set()
        .into_iter()
        .filter(|s| !candidate.contains(s))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(FOCUS_SKILL_LIMIT)
        .collect();

    if missing.is_empty() {
        format!("advanced architecture in {}", job.title)
    } else {
        missing.join(", ")
    }
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Replaces `{key}` placeholders in one left-to-right pass. Unknown
/// placeholders and stray braces are copied through unchanged.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = vars.iter().find(|(key, _)| {
            tail.strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::Recommendation;

    fn profile(skills: &[&str]) -> Profile {
        Profile {
            name: "Ada".to_string(),
            email: "a@x.com".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: 4,
            education: "BSc".to_string(),
        }
    }

    fn job(skills: &[&str]) -> JobRequirement {
        JobRequirement {
            title: "Data Engineer".to_string(),
            min_experience_years: 3,
            required_education: String::new(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn report(score: f64, matched: &[&str]) -> Report {
        Report {
            candidate_name: "Ada".into(),
            email: "a@x.com".into(),
            education: "BSc".into(),
            experience_years: 4,
            job_title: "Data Engineer".into(),
            match_score: score,
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            recommendation: Recommendation::from_score(score),
            ai_explanation: None,
            ai_interview_questions: None,
        }
    }

    #[test]
    fn test_analysis_prompt_carries_truth_data() {
        let prompt = analysis_prompt(
            &profile(&["python", "sql"]),
            &job(&["Python", "Spark"]),
            &report(70.0, &["python"]),
        );
        assert!(prompt.contains("- Job Title: Data Engineer"));
        assert!(prompt.contains("- Required Skills: Python, Spark"));
        assert!(prompt.contains("- Candidate Skills: python, sql"));
        assert!(prompt.contains("- Matched Skills: python"));
        assert!(prompt.contains("- Experience: 4 years"));
        assert!(prompt.contains("- Calculated Score: 70.0/100"));
    }

    #[test]
    fn test_analysis_prompt_has_all_sections_and_constraints() {
        let prompt = analysis_prompt(&profile(&[]), &job(&[]), &report(0.0, &[]));
        for section in [
            "### SYSTEM ROLE",
            "### TRUTH DATA (USE VERBATIM)",
            "### TASK",
            "### NEGATIVE CONSTRAINTS",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("Do NOT recommend hire/reject."));
        assert!(prompt.contains("Do NOT explain or restate the math or value of the score."));
        assert!(prompt.contains("Do NOT invent skills"));
        assert!(prompt.contains("- Candidate Skills: None listed"));
        assert!(prompt.contains("- Matched Skills: None"));
        assert!(!prompt.contains("{"), "unfilled placeholder in:\n{prompt}");
    }

    #[test]
    fn test_questions_prompt_names_missing_skills() {
        let prompt = interview_questions_prompt(
            &profile(&["python"]),
            &job(&["Python", "Spark", "Airflow", "Kafka"]),
            &report(25.0, &["python"]),
        );
        assert!(prompt.contains("- Missing / Weak Areas: airflow, kafka"));
        assert!(prompt.contains("Test understanding of airflow, kafka."));
        assert!(prompt.contains("- Match Score: 25.0"));
        assert!(prompt.contains("- Role: Data Engineer"));
        assert!(prompt.contains("### NEGATIVE CONSTRAINTS"));
    }

    #[test]
    fn test_focus_area_is_sorted_and_capped_at_two() {
        let focus = focus_area(&profile(&[]), &job(&["Zig", "Ada", "COBOL"]));
        assert_eq!(focus, "ada, cobol");
    }

    #[test]
    fn test_focus_area_is_case_insensitive() {
        let focus = focus_area(&profile(&["SPARK"]), &job(&["spark", "Flink"]));
        assert_eq!(focus, "flink");
    }

    #[test]
    fn test_focus_area_falls_back_to_architecture() {
        let focus = focus_area(&profile(&["python", "spark"]), &job(&["Python", "Spark"]));
        assert_eq!(focus, "advanced architecture in Data Engineer");

        let focus = focus_area(&profile(&[]), &job(&[]));
        assert_eq!(focus, "advanced architecture in Data Engineer");
    }

    #[test]
    fn test_fill_template_is_single_pass() {
        let out = fill_template("{a} and {b}", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "{b} and x");
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders_and_braces() {
        let out = fill_template("{known} {unknown} { lone", &[("known", "ok")]);
        assert_eq!(out, "ok {unknown} { lone");
    }

    #[test]
    fn test_title_with_braces_inserted_literally() {
        let mut j = job(&["Go"]);
        j.title = "Engineer {score}".to_string();
        let prompt = interview_questions_prompt(&profile(&[]), &j, &report(10.0, &[]));
        assert!(prompt.contains("- Role: Engineer {score}"));
    }
}

//! Job requirements and the normalization step that turns arbitrary JSON into them.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// Structured hiring criteria for one role.
///
/// `required_skills` keeps the input spelling and order for display; every
/// comparison goes through [`JobRequirement::skill_set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequirement {
    pub title: String,
    pub min_experience_years: u32,
    pub required_education: String,
    pub required_skills: Vec<String>,
}

impl Default for JobRequirement {
    fn default() -> Self {
        Self {
            title: UNKNOWN_ROLE.to_string(),
            min_experience_years: 0,
            required_education: String::new(),
            required_skills: Vec::new(),
        }
    }
}

impl JobRequirement {
    /// Distinct, lower-cased required skills.
    pub fn skill_set(&self) -> HashSet<String> {
        self.required_skills.iter().map(|s| s.to_lowercase()).collect()
    }
}

/// Rejections raised before any scoring happens. Messages are shown verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobPayloadError {
    #[error("Invalid job description JSON. Please check syntax.")]
    InvalidJson,

    #[error("Job description must be a JSON object or list of objects.")]
    WrongShape,

    #[error("No valid job descriptions found. Please check your JSON input.")]
    NoValidJobs,
}

/// Parses raw job JSON text into one or more normalized requirements.
pub fn parse_job_payload(text: &str) -> Result<Vec<JobRequirement>, JobPayloadError> {
    let value: Value = serde_json::from_str(text).map_err(|_| JobPayloadError::InvalidJson)?;
    jobs_from_value(&value)
}

/// Accepts a single job object or an array of them. Non-object array items are dropped.
pub fn jobs_from_value(value: &Value) -> Result<Vec<JobRequirement>, JobPayloadError> {
    let raw_jobs: Vec<&Value> = match value {
        Value::Object(_) => vec![value],
        Value::Array(items) => items.iter().collect(),
        _ => return Err(JobPayloadError::WrongShape),
    };

    let jobs: Vec<JobRequirement> = raw_jobs.into_iter().filter_map(normalize_job).collect();
    if jobs.is_empty() {
        return Err(JobPayloadError::NoValidJobs);
    }
    Ok(jobs)
}

/// Normalizes one job object, filling defaults for anything missing or mistyped.
/// Returns `None` only when the value is not a JSON object.
pub fn normalize_job(value: &Value) -> Option<JobRequirement> {
    let obj = value.as_object()?;

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ROLE)
        .to_string();

    let required_education = obj
        .get("required_education")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(JobRequirement {
        title,
        min_experience_years: coerce_years(obj.get("min_experience_years")),
        required_education,
        required_skills: extract_skills(obj),
    })
}

/// `required_skills` wins when it holds anything; otherwise `skills` is consulted.
fn extract_skills(obj: &Map<String, Value>) -> Vec<String> {
    let chosen = obj
        .get("required_skills")
        .filter(|v| is_truthy(v))
        .or_else(|| obj.get("skills").filter(|v| is_truthy(v)));

    match chosen {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn coerce_years(value: Option<&Value>) -> u32 {
    let years: i64 = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    };
    years.clamp(0, i64::from(u32::MAX)) as u32
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical verdict derived from the match score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONGLY RECOMMENDED")]
    StronglyRecommended,
    #[serde(rename = "RECOMMENDED")]
    Recommended,
    #[serde(rename = "REVIEW NEEDED")]
    ReviewNeeded,
    #[serde(rename = "NOT RECOMMENDED")]
    NotRecommended,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::StronglyRecommended
        } else if score >= 60.0 {
            Self::Recommended
        } else if score >= 40.0 {
            Self::ReviewNeeded
        } else {
            Self::NotRecommended
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StronglyRecommended => "STRONGLY RECOMMENDED",
            Self::Recommended => "RECOMMENDED",
            Self::ReviewNeeded => "REVIEW NEEDED",
            Self::NotRecommended => "NOT RECOMMENDED",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (candidate, job) result. This is also the persisted record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub candidate_name: String,
    pub email: String,
    pub education: String,
    pub experience_years: u32,
    pub job_title: String,
    pub match_score: f64,
    /// Sorted ascending.
    pub matched_skills: Vec<String>,
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_interview_questions: Option<String>,
}

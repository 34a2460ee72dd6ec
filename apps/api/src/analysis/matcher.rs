//! Matcher — deterministic, weighted compatibility score between a profile and a job.
//!
//! Algorithm:
//! 1. Skills (max 60): `60 × |profile ∩ required| / |required|`, case-insensitive.
//!    An empty requirement list contributes 0, not a free 60.
//! 2. Experience (max 30): 30 when the minimum is met, 10 for any non-zero
//!    experience below it, 0 otherwise. No proximity credit.
//! 3. Education (max 10): 10 when the required education, lower-cased, is a
//!    substring of the candidate's education.
//! 4. Sum, cap at 100, round to one decimal (ties to even).

use std::collections::HashSet;

use crate::models::job::JobRequirement;
use crate::models::profile::Profile;

pub const SKILL_WEIGHT: f64 = 60.0;
pub const EXPERIENCE_MET_POINTS: f64 = 30.0;
pub const EXPERIENCE_PARTIAL_POINTS: f64 = 10.0;
pub const EDUCATION_POINTS: f64 = 10.0;
pub const MAX_SCORE: f64 = 100.0;

/// Score for one (profile, job) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// In `[0, 100]`, one decimal place.
    pub score: f64,
    /// Lower-cased intersection, unordered. Sorting is the reporter's job.
    pub matched_skills: HashSet<String>,
}

pub fn match_candidate(profile: &Profile, job: &JobRequirement) -> MatchResult {
    let candidate_skills: HashSet<String> =
        profile.skills.iter().map(|s| s.to_lowercase()).collect();
    let required = job.skill_set();

    let matched_skills: HashSet<String> =
        candidate_skills.intersection(&required).cloned().collect();

    let raw = skill_points(matched_skills.len(), required.len())
        + experience_points(profile.experience, job.min_experience_years)
        + education_points(&profile.education, &job.required_education);

    MatchResult {
        score: round_one_decimal(raw.min(MAX_SCORE)),
        matched_skills,
    }
}

fn skill_points(matched: usize, required: usize) -> f64 {
    if required == 0 {
        return 0.0;
    }
    matched as f64 / required as f64 * SKILL_WEIGHT
}

fn experience_points(years: u32, min_years: u32) -> f64 {
    if years >= min_years {
        EXPERIENCE_MET_POINTS
    } else if years > 0 {
        EXPERIENCE_PARTIAL_POINTS
    } else {
        0.0
    }
}

fn education_points(candidate: &str, required: &str) -> f64 {
    if !required.is_empty() && candidate.to_lowercase().contains(&required.to_lowercase()) {
        EDUCATION_POINTS
    } else {
        0.0
    }
}

/// Rounds the exact binary value half-to-even, so 11.25 becomes 11.2.
/// `(v * 10).round()` would round that tie away from zero.
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

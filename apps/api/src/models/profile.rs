use serde::Serialize;

/// Placeholder used for text fields the parser could not find.
pub const UNKNOWN: &str = "Unknown";

/// Structured candidate data extracted from a free-text résumé.
///
/// Built once by the résumé parser and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    /// Lower-cased, first-seen order, duplicates kept.
    pub skills: Vec<String>,
    /// Years of experience.
    pub experience: u32,
    pub education: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            email: UNKNOWN.to_string(),
            skills: Vec::new(),
            experience: 0,
            education: UNKNOWN.to_string(),
        }
    }
}

//! Résumé Parser — turns loosely labelled résumé text into a [`Profile`].
//!
//! Lenient by contract: malformed input never errors, it just leaves fields at
//! their defaults.

use crate::models::profile::Profile;

/// Field labels in match priority order. A line sets at most one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Name,
    Email,
    Education,
    Experience,
    Skills,
}

const LABELS: [(Label, &str); 5] = [
    (Label::Name, "Name:"),
    (Label::Email, "Email:"),
    (Label::Education, "Education:"),
    (Label::Experience, "Experience:"),
    (Label::Skills, "Skills:"),
];

/// Parses raw résumé text into a profile.
///
/// Labels are case-sensitive and may appear anywhere in a line; the value is
/// whatever follows the first occurrence, trimmed. Later lines overwrite
/// earlier ones for the same field.
pub fn parse_resume(text: &str) -> Profile {
    let mut profile = Profile::default();

    for line in text.split('\n') {
        let line = line.trim();
        let Some((label, value)) = find_label(line) else {
            continue;
        };

        match label {
            Label::Name => profile.name = value.to_string(),
            Label::Email => profile.email = value.to_string(),
            Label::Education => profile.education = value.to_string(),
            Label::Experience => {
                if let Some(years) = concat_digits(value) {
                    profile.experience = years;
                }
            }
            Label::Skills => profile.skills = split_skills(value),
        }
    }

    profile
}

fn find_label(line: &str) -> Option<(Label, &str)> {
    LABELS.iter().find_map(|(label, marker)| {
        line.split_once(marker)
            .map(|(_, rest)| (*label, rest.trim()))
    })
}

/// Keeps every ASCII digit and reads them as one number: "2 to 10 years" → 210.
/// Returns `None` when there are no digits. Saturates instead of overflowing.
fn concat_digits(text: &str) -> Option<u32> {
    let mut digits = text.chars().filter_map(|c| c.to_digit(10)).peekable();
    digits.peek()?;
    Some(digits.fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d)))
}

/// Comma-separated, trimmed, lower-cased. Empty tokens are kept.
fn split_skills(text: &str) -> Vec<String> {
    text.split(',').map(|s| s.trim().to_lowercase()).collect()
}

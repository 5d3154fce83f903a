//! Skill-gap and shortlist helpers. Pure set/ordering logic; the relational
//! aggregates feeding these live in the db crate.

use crate::domain::employee::{MentorCandidate, SpecializationMatch};

/// Cap applied to every recommendation and mentor shortlist.
pub const SHORTLIST_CAP: usize = 3;

/// Specializations already matched at or above this percentage are not worth
/// recommending.
const ALREADY_QUALIFIED_PCT: f64 = 90.0;

/// Skills required by a target role that the employee does not yet have.
/// Comparison is case-insensitive; the required ordering is preserved.
pub fn skill_gap(required: &[String], current: &[String]) -> Vec<String> {
    let current_lower: Vec<String> = current.iter().map(|s| s.to_lowercase()).collect();
    required
        .iter()
        .filter(|skill| !current_lower.contains(&skill.to_lowercase()))
        .cloned()
        .collect()
}

/// Top recommendations by descending overlap percentage, excluding
/// specializations the employee already effectively holds.
pub fn shortlist_recommendations(mut matches: Vec<SpecializationMatch>) -> Vec<SpecializationMatch> {
    matches.retain(|candidate| candidate.overlap_pct < ALREADY_QUALIFIED_PCT);
    matches.sort_by(|a, b| {
        b.overlap_pct.partial_cmp(&a.overlap_pct).unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(SHORTLIST_CAP);
    matches
}

/// Mentor candidates ordered by ascending tenure-in-role (most recently
/// arrived first), capped at three. The ordering is a deliberate carry-over
/// from the product's original behavior.
pub fn shortlist_mentors(mut candidates: Vec<MentorCandidate>) -> Vec<MentorCandidate> {
    candidates.sort_by_key(|candidate| candidate.days_in_role);
    candidates.truncate(SHORTLIST_CAP);
    candidates
}

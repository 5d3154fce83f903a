//! Keyword rules evaluated once per turn. Precedence is explicit: the
//! well-being guard runs before state dispatch, then the per-state rules
//! below in the order they are written.

/// Main-menu option selected by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    CareerPathways,
    UpskillingPlan,
    LeadershipPotential,
    FindMentor,
}

const WELLBEING_TRIGGERS: &[&str] =
    &["stress", "anxious", "overwhelmed", "burnt out", "burned out", "unhappy", "sad"];

const AFFIRMATIVES: &[&str] = &["yes", "ok", "sure", "please", "yeah"];

const SUPPORT_EXIT_KEYWORDS: &[&str] = &["thanks", "ok", "menu", "career", "skills", "pathway"];

/// Case-insensitive substring scan for well-being triggers. Returns the
/// matched trigger so the caller can log which word fired.
pub fn wellbeing_trigger(message: &str) -> Option<&'static str> {
    let normalized = message.to_lowercase();
    WELLBEING_TRIGGERS.iter().find(|trigger| normalized.contains(*trigger)).copied()
}

/// Menu selection by digit or keyword. Evaluated in menu order so a message
/// like "1 pathway please" resolves to the first matching rule.
pub fn detect_menu_choice(message: &str) -> Option<MenuChoice> {
    let normalized = message.to_lowercase();
    if normalized.contains('1') || normalized.contains("pathway") {
        return Some(MenuChoice::CareerPathways);
    }
    if normalized.contains('2') || normalized.contains("upskill") {
        return Some(MenuChoice::UpskillingPlan);
    }
    if normalized.contains('3') || normalized.contains("leadership") {
        return Some(MenuChoice::LeadershipPotential);
    }
    if normalized.contains('4') || normalized.contains("mentor") {
        return Some(MenuChoice::FindMentor);
    }
    None
}

pub fn is_affirmative(message: &str) -> bool {
    let normalized = message.to_lowercase();
    AFFIRMATIVES.iter().any(|word| normalized.contains(word))
}

/// Whether a support-mode message asks to return to the structured flows.
pub fn wants_menu_return(message: &str) -> bool {
    let normalized = message.to_lowercase();
    SUPPORT_EXIT_KEYWORDS.iter().any(|word| normalized.contains(word))
}

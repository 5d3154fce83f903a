use serde::{Deserialize, Serialize};

use crate::domain::employee::EmployeeId;

/// Active branch of the conversation flow. Serialized as the wire tag the
/// caller echoes back on the next turn; there is no server-side session
/// store, so this enum plus the rolling history is the entire state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    Start,
    OnboardingSkills,
    MainMenu,
    AwaitingUpskillTarget,
    AwaitingResourceRequest,
    AwaitingLeadershipImprovement,
    AwaitingMentorQuery,
    SupportMode,
}

impl ConversationState {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::OnboardingSkills => "ONBOARDING_SKILLS",
            Self::MainMenu => "MAIN_MENU",
            Self::AwaitingUpskillTarget => "AWAITING_UPSKILL_TARGET",
            Self::AwaitingResourceRequest => "AWAITING_RESOURCE_REQUEST",
            Self::AwaitingLeadershipImprovement => "AWAITING_LEADERSHIP_IMPROVEMENT",
            Self::AwaitingMentorQuery => "AWAITING_MENTOR_QUERY",
            Self::SupportMode => "SUPPORT_MODE",
        }
    }

    /// Resolve an inbound tag. A missing tag means the conversation is just
    /// starting; an unrecognized tag yields `None`, which the engine answers
    /// with a fixed fallback reply instead of dispatching.
    pub fn resolve(tag: Option<&str>) -> Option<Self> {
        match tag {
            None => Some(Self::Start),
            Some(raw) => Self::from_tag(raw),
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "START" => Some(Self::Start),
            "ONBOARDING_SKILLS" => Some(Self::OnboardingSkills),
            "MAIN_MENU" => Some(Self::MainMenu),
            "AWAITING_UPSKILL_TARGET" => Some(Self::AwaitingUpskillTarget),
            "AWAITING_RESOURCE_REQUEST" => Some(Self::AwaitingResourceRequest),
            "AWAITING_LEADERSHIP_IMPROVEMENT" => Some(Self::AwaitingLeadershipImprovement),
            "AWAITING_MENTOR_QUERY" => Some(Self::AwaitingMentorQuery),
            "SUPPORT_MODE" => Some(Self::SupportMode),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// One inbound conversation turn. Ephemeral; the caller carries the state
/// tag and history across turns. `state` is `None` when the caller echoed
/// a tag the controller does not recognize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub employee_id: EmployeeId,
    pub message: String,
    pub state: Option<ConversationState>,
    pub history: Vec<ChatMessage>,
}

/// The controller's output: always both fields, never partial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub next_state: ConversationState,
}

impl Reply {
    pub fn new(text: impl Into<String>, next_state: ConversationState) -> Self {
        Self { text: text.into(), next_state }
    }
}

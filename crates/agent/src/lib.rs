//! Conversation engine for the career assistant.
//!
//! This crate is the orchestration layer between the HTTP surface and the
//! structured data: it drives the per-turn state machine, consults the
//! employee directory and the leadership scorer, and delegates open-ended
//! questions to an external chat-completion endpoint.
//!
//! # Key types
//!
//! - `ConversationEngine`: one call per inbound turn, always resolves to a
//!   reply plus next state (see `conversation`)
//! - `ChatCompleter`: pluggable trait over the generative responder, with a
//!   reqwest-backed OpenAI-compatible client (see `llm`)
//!
//! # Safety principle
//!
//! The generative responder never decides transitions, scores, or
//! recommendations. Those are deterministic outcomes of the state machine
//! and the structured data; the responder only fills in free-text replies.

pub mod conversation;
pub mod llm;
pub mod prompts;

pub use conversation::{ConversationEngine, TurnError};
pub use llm::{ChatCompleter, OpenAiChatClient};

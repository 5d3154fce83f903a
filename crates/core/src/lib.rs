pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod leadership;
pub mod skills;

pub use dialogue::rules::{detect_menu_choice, is_affirmative, wants_menu_return, wellbeing_trigger, MenuChoice};
pub use dialogue::states::{ChatMessage, ChatRole, ConversationState, Reply, Turn};
pub use domain::employee::{Employee, EmployeeDetails, EmployeeId, ExperienceRecord, MentorCandidate, SpecializationMatch};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use leadership::{LeadershipAssessment, LeadershipFeatures, LeadershipModel, ModelError, TrainingSample};
pub use skills::{shortlist_mentors, shortlist_recommendations, skill_gap};

//! The per-turn state machine. Every call resolves to a reply plus next
//! state; collaborator failures never terminate the conversation, with one
//! deliberate exception: a missing leadership model is a deployment defect
//! and surfaces as `TurnError::ScorerUnavailable` instead of a quiet zero.

use std::sync::Arc;

use thiserror::Error;

use compass_core::dialogue::rules::{
    detect_menu_choice, is_affirmative, wants_menu_return, wellbeing_trigger, MenuChoice,
};
use compass_core::dialogue::states::{ChatMessage, ConversationState, Reply, Turn};
use compass_core::domain::employee::Employee;
use compass_core::leadership::LeadershipModel;
use compass_core::skills::{shortlist_mentors, shortlist_recommendations, skill_gap};
use compass_db::repositories::{EmployeeRepository, RepositoryError};

use crate::llm::ChatCompleter;
use crate::prompts::{coach_prompt, support_prompt};

const MENU: &str = "1. Explore Career Pathways\n2. Get an Upskilling Plan\n3. Assess Leadership Potential\n4. Find a Mentor";

const NOT_FOUND_REPLY: &str =
    "I'm sorry, that employee ID was not found. Please enter a valid Employee ID to begin.";

const WELLBEING_REPLY: &str = "It sounds like you're carrying a lot right now, and I'm sorry to \
     hear that. I'm here to listen, and if you'd like to talk to someone, our Employee Assistance \
     Programme is available confidentially at any time. Would you like to share more about \
     what's on your mind?";

const RESPONDER_DOWN_REPLY: &str = "Sorry, there was an error connecting to the AI service.";

const SUPPORT_FALLBACK_REPLY: &str =
    "I'm here for you. Take all the time you need, and share whatever feels right.";

const UNMATCHED_STATE_REPLY: &str =
    "I'm not sure how to handle that. Let's go back to the main menu.";

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("leadership model is not loaded")]
    ScorerUnavailable,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct ConversationEngine {
    directory: Arc<dyn EmployeeRepository>,
    responder: Arc<dyn ChatCompleter>,
    scorer: Option<LeadershipModel>,
}

impl ConversationEngine {
    pub fn new(
        directory: Arc<dyn EmployeeRepository>,
        responder: Arc<dyn ChatCompleter>,
        scorer: Option<LeadershipModel>,
    ) -> Self {
        Self { directory, responder, scorer }
    }

    pub fn scorer_loaded(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn scorer(&self) -> Option<&LeadershipModel> {
        self.scorer.as_ref()
    }

    pub async fn handle_turn(&self, turn: &Turn) -> Result<Reply, TurnError> {
        let Some(employee) = self.directory.find_by_id(&turn.employee_id).await? else {
            return Ok(Reply::new(NOT_FOUND_REPLY, ConversationState::Start));
        };

        // Cross-cutting interrupt, evaluated before state dispatch.
        if turn.state != Some(ConversationState::SupportMode) {
            if let Some(trigger) = wellbeing_trigger(&turn.message) {
                tracing::info!(
                    event_name = "wellbeing_guard_tripped",
                    employee_id = %employee.id,
                    trigger,
                );
                return Ok(Reply::new(WELLBEING_REPLY, ConversationState::SupportMode));
            }
        }

        match turn.state {
            Some(ConversationState::Start) => self.greet(&employee).await,
            Some(ConversationState::OnboardingSkills) => self.onboard(&employee, turn).await,
            Some(ConversationState::MainMenu) => self.main_menu(&employee, turn).await,
            Some(ConversationState::AwaitingUpskillTarget) => {
                self.upskill_target(&employee, turn).await
            }
            Some(ConversationState::AwaitingResourceRequest) => Ok(resource_request(turn)),
            Some(ConversationState::AwaitingLeadershipImprovement) => Ok(improvement_tips(turn)),
            Some(ConversationState::AwaitingMentorQuery) => self.mentor_query(&employee, turn).await,
            Some(ConversationState::SupportMode) => self.support(&employee, turn).await,
            None => Ok(Reply::new(UNMATCHED_STATE_REPLY, ConversationState::MainMenu)),
        }
    }

    async fn greet(&self, employee: &Employee) -> Result<Reply, TurnError> {
        if self.directory.has_skills(&employee.id).await? {
            Ok(Reply::new(
                format!(
                    "Welcome back, {}! What can I help you with today?\n{MENU}",
                    employee.name
                ),
                ConversationState::MainMenu,
            ))
        } else {
            Ok(Reply::new(
                format!(
                    "Welcome, {}! It looks like this is your first time. To personalize your \
                     experience, please tell me about your skills. You can list them separated \
                     by commas.",
                    employee.name
                ),
                ConversationState::OnboardingSkills,
            ))
        }
    }

    async fn onboard(&self, employee: &Employee, turn: &Turn) -> Result<Reply, TurnError> {
        let skills: Vec<String> = turn
            .message
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        if skills.is_empty() {
            return Ok(Reply::new(
                "I didn't catch any skills there. Please list them separated by commas, \
                 for example: Python, SQL, Project Management.",
                ConversationState::OnboardingSkills,
            ));
        }

        self.directory.add_skills(&employee.id, &skills).await?;
        tracing::info!(
            event_name = "onboarding_skills_recorded",
            employee_id = %employee.id,
            skill_count = skills.len(),
        );

        Ok(Reply::new(
            format!(
                "Thank you for sharing your skills! Your profile is now set up. What can I \
                 help you with today?\n{MENU}"
            ),
            ConversationState::MainMenu,
        ))
    }

    async fn main_menu(&self, employee: &Employee, turn: &Turn) -> Result<Reply, TurnError> {
        match detect_menu_choice(&turn.message) {
            Some(MenuChoice::CareerPathways) => self.career_pathways(employee).await,
            Some(MenuChoice::UpskillingPlan) => Ok(Reply::new(
                "Great! To generate an upskilling plan, which job role or specialization \
                 are you aiming for?",
                ConversationState::AwaitingUpskillTarget,
            )),
            Some(MenuChoice::LeadershipPotential) => self.leadership_potential(employee).await,
            Some(MenuChoice::FindMentor) => Ok(Reply::new(
                "I can help with that. Which skill or role would you like a mentor for?",
                ConversationState::AwaitingMentorQuery,
            )),
            None => {
                let skills = self.directory.skills_for(&employee.id).await?;
                let prompt = coach_prompt(employee, &skills);
                let reply = self
                    .delegate(&prompt, turn)
                    .await
                    .unwrap_or_else(|| RESPONDER_DOWN_REPLY.to_string());
                Ok(Reply::new(reply, ConversationState::MainMenu))
            }
        }
    }

    async fn career_pathways(&self, employee: &Employee) -> Result<Reply, TurnError> {
        let matches = self.directory.specialization_matches(&employee.id).await?;
        let shortlist = shortlist_recommendations(matches);

        if shortlist.is_empty() {
            return Ok(Reply::new(
                "I couldn't find any specific recommendations for you at this time.",
                ConversationState::MainMenu,
            ));
        }

        let listing = shortlist
            .iter()
            .map(|candidate| {
                format!(
                    "{} ({:.0}% skill overlap)",
                    candidate.specialization_name, candidate.overlap_pct
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Reply::new(
            format!("Based on your skills, you could explore specializations like: {listing}."),
            ConversationState::MainMenu,
        ))
    }

    async fn leadership_potential(&self, employee: &Employee) -> Result<Reply, TurnError> {
        let Some(scorer) = &self.scorer else {
            return Err(TurnError::ScorerUnavailable);
        };

        let Some(features) = self.directory.leadership_features(&employee.id).await? else {
            return Ok(Reply::new(NOT_FOUND_REPLY, ConversationState::Start));
        };

        let assessment = scorer.assess(features);
        Ok(Reply::new(
            format!(
                "Your leadership potential score is {score}/100.\nContributing factors: \
                 {factors}.\nWould you like some tips on developing your leadership potential?",
                score = assessment.score,
                factors = assessment.factors.join("; "),
            ),
            ConversationState::AwaitingLeadershipImprovement,
        ))
    }

    async fn upskill_target(&self, employee: &Employee, turn: &Turn) -> Result<Reply, TurnError> {
        let target = turn.message.trim();

        let Some((specialization, required)) =
            self.directory.required_skills_for(target).await?
        else {
            return Ok(Reply::new(
                format!(
                    "I couldn't find a specialization matching '{target}'. Could you try \
                     another role or specialization name?"
                ),
                ConversationState::AwaitingUpskillTarget,
            ));
        };

        let current = self.directory.skills_for(&employee.id).await?;
        let gap = skill_gap(&required, &current);

        if gap.is_empty() {
            return Ok(Reply::new(
                format!(
                    "Great news, {}! You already possess all the necessary skills for a role \
                     in '{specialization}'. What can I help you with next?\n{MENU}",
                    employee.name
                ),
                ConversationState::MainMenu,
            ));
        }

        Ok(Reply::new(
            format!(
                "To move into a role in '{specialization}', you would need to develop skills \
                 in {}. Would you like me to suggest some resources?",
                gap.join(", ")
            ),
            ConversationState::AwaitingResourceRequest,
        ))
    }

    async fn mentor_query(&self, employee: &Employee, turn: &Turn) -> Result<Reply, TurnError> {
        let term = turn.message.trim();
        let candidates = self.directory.mentor_candidates(term, &employee.id).await?;
        let shortlist = shortlist_mentors(candidates);

        if shortlist.is_empty() {
            return Ok(Reply::new(
                format!(
                    "I couldn't find any colleagues with skills matching '{term}'. Could you \
                     try a different skill or role?"
                ),
                ConversationState::AwaitingMentorQuery,
            ));
        }

        let listing = shortlist
            .iter()
            .map(|mentor| format!("- {} ({}) - {}", mentor.name, mentor.job_title, mentor.email))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Reply::new(
            format!("Here are some colleagues who could mentor you on '{term}':\n{listing}"),
            ConversationState::MainMenu,
        ))
    }

    async fn support(&self, employee: &Employee, turn: &Turn) -> Result<Reply, TurnError> {
        if wants_menu_return(&turn.message) {
            return Ok(Reply::new(
                format!(
                    "I'm glad I could be here for you. Whenever you're ready:\n{MENU}"
                ),
                ConversationState::MainMenu,
            ));
        }

        let prompt = support_prompt(&employee.name);
        let reply = self
            .delegate(&prompt, turn)
            .await
            .unwrap_or_else(|| SUPPORT_FALLBACK_REPLY.to_string());
        Ok(Reply::new(reply, ConversationState::SupportMode))
    }

    /// One responder round-trip with the current message appended to the
    /// caller-supplied history. Transport failures are logged and absorbed.
    async fn delegate(&self, system_prompt: &str, turn: &Turn) -> Option<String> {
        let mut messages = turn.history.clone();
        messages.push(ChatMessage::user(turn.message.clone()));

        match self.responder.complete(system_prompt, &messages).await {
            Ok(reply) => Some(reply),
            Err(error) => {
                tracing::warn!(
                    event_name = "responder_unavailable",
                    employee_id = %turn.employee_id,
                    error = %error,
                );
                None
            }
        }
    }
}

fn resource_request(turn: &Turn) -> Reply {
    if is_affirmative(&turn.message) {
        Reply::new(
            format!(
                "You can find curated courses for those skills on the internal learning \
                 portal; I've flagged them for your development plan. What else can I help \
                 you with?\n{MENU}"
            ),
            ConversationState::MainMenu,
        )
    } else {
        Reply::new(
            format!("No problem. What else can I help you with?\n{MENU}"),
            ConversationState::MainMenu,
        )
    }
}

fn improvement_tips(turn: &Turn) -> Reply {
    if turn.message.to_lowercase().contains("yes") {
        Reply::new(
            format!(
                "Here are a few ways to build leadership potential: volunteer to lead a \
                 small cross-team initiative, find a mentor in a leadership role, and ask \
                 your manager for feedback on one leadership behaviour each quarter. What \
                 else can I help you with?\n{MENU}"
            ),
            ConversationState::MainMenu,
        )
    } else {
        Reply::new(
            format!("Understood. What else can I help you with?\n{MENU}"),
            ConversationState::MainMenu,
        )
    }
}

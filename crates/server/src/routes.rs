//! JSON API surface consumed by the chat frontend. Error responses always
//! carry a correlation id that is also attached to the server-side log line.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use compass_agent::{ConversationEngine, TurnError};
use compass_core::dialogue::states::{ChatMessage, ConversationState, Turn};
use compass_core::domain::employee::{Employee, EmployeeDetails, EmployeeId, ExperienceRecord};
use compass_core::errors::{ApplicationError, DomainError, InterfaceError};
use compass_core::leadership::LeadershipAssessment;
use compass_core::skills::shortlist_recommendations;
use compass_db::{EmployeeRepository, RepositoryError};

#[derive(Clone)]
pub struct ApiState {
    engine: Arc<ConversationEngine>,
    directory: Arc<dyn EmployeeRepository>,
}

impl ApiState {
    pub fn new(engine: Arc<ConversationEngine>, directory: Arc<dyn EmployeeRepository>) -> Self {
        Self { engine, directory }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/chatbot", post(chatbot_turn))
        .route("/api/employee/{id}", get(employee_profile))
        .route("/api/employee/{id}/career_recommendations", get(career_recommendations))
        .route("/api/employee/{id}/leadership_potential", get(leadership_potential))
        .route("/api/employee/{id}/details", get(employee_details))
        .route("/api/employee/{id}/update", post(update_employee))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    correlation_id: String,
}

type ErrorReply = (StatusCode, Json<ApiError>);

fn render(error: InterfaceError) -> ErrorReply {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ApiError {
        error: error.user_message().to_string(),
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body))
}

fn not_found(message: &str) -> ErrorReply {
    render(InterfaceError::NotFound {
        message: message.to_string(),
        correlation_id: Uuid::new_v4().to_string(),
    })
}

fn repository_failure(context: &str, source: &RepositoryError) -> ErrorReply {
    let correlation_id = Uuid::new_v4().to_string();
    error!(
        event_name = "api.repository_failure",
        correlation_id = %correlation_id,
        context,
        error = %source,
    );
    render(ApplicationError::Persistence(source.to_string()).into_interface(correlation_id))
}

fn scorer_unavailable() -> ErrorReply {
    let correlation_id = Uuid::new_v4().to_string();
    error!(event_name = "api.scorer_unavailable", correlation_id = %correlation_id);
    render(
        ApplicationError::from(DomainError::ScorerUnavailable).into_interface(correlation_id),
    )
}

#[derive(Debug, Deserialize)]
struct ChatTurnRequest {
    message: String,
    employee_id: String,
    state: Option<String>,
    history: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Serialize)]
struct ChatTurnResponse {
    reply: String,
    next_state: ConversationState,
}

async fn chatbot_turn(
    State(state): State<ApiState>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, ErrorReply> {
    let turn = Turn {
        employee_id: EmployeeId(request.employee_id),
        message: request.message,
        state: ConversationState::resolve(request.state.as_deref()),
        history: request.history.unwrap_or_default(),
    };

    match state.engine.handle_turn(&turn).await {
        Ok(reply) => {
            Ok(Json(ChatTurnResponse { reply: reply.text, next_state: reply.next_state }))
        }
        Err(TurnError::ScorerUnavailable) => Err(scorer_unavailable()),
        Err(TurnError::Repository(source)) => Err(repository_failure("chatbot_turn", &source)),
    }
}

async fn employee_profile(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ErrorReply> {
    let employee_id = EmployeeId(id);
    match state.directory.find_by_id(&employee_id).await {
        Ok(Some(employee)) => Ok(Json(employee)),
        Ok(None) => Err(not_found("Employee not found.")),
        Err(source) => Err(repository_failure("employee_profile", &source)),
    }
}

#[derive(Debug, Serialize)]
struct Recommendation {
    recommended_role: String,
    skill_overlap_pct: f64,
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    recommendations: Vec<Recommendation>,
}

async fn career_recommendations(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<RecommendationsResponse>, ErrorReply> {
    let employee_id = EmployeeId(id);
    let matches = state
        .directory
        .specialization_matches(&employee_id)
        .await
        .map_err(|source| repository_failure("career_recommendations", &source))?;

    let recommendations = shortlist_recommendations(matches)
        .into_iter()
        .map(|candidate| Recommendation {
            recommended_role: candidate.specialization_name,
            skill_overlap_pct: candidate.overlap_pct,
        })
        .collect();

    Ok(Json(RecommendationsResponse { recommendations }))
}

async fn leadership_potential(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<LeadershipAssessment>, ErrorReply> {
    let Some(scorer) = state.engine.scorer() else {
        return Err(scorer_unavailable());
    };

    let employee_id = EmployeeId(id);
    match state.directory.leadership_features(&employee_id).await {
        Ok(Some(features)) => Ok(Json(scorer.assess(features))),
        Ok(None) => Err(not_found("Employee not found.")),
        Err(source) => Err(repository_failure("leadership_potential", &source)),
    }
}

async fn employee_details(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeDetails>, ErrorReply> {
    let employee_id = EmployeeId(id);
    match state.directory.find_by_id(&employee_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(not_found("Employee not found.")),
        Err(source) => return Err(repository_failure("employee_details", &source)),
    }

    state
        .directory
        .details_for(&employee_id)
        .await
        .map(Json)
        .map_err(|source| repository_failure("employee_details", &source))
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    experiences: Vec<ExperienceRecord>,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    status: &'static str,
}

async fn update_employee(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ErrorReply> {
    let employee_id = EmployeeId(id);
    match state.directory.find_by_id(&employee_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(not_found("Employee not found.")),
        Err(source) => return Err(repository_failure("update_employee", &source)),
    }

    let details =
        EmployeeDetails { skills: request.skills, experiences: request.experiences };
    state
        .directory
        .replace_details(&employee_id, &details)
        .await
        .map_err(|source| repository_failure("update_employee", &source))?;

    Ok(Json(UpdateResponse { status: "updated" }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use compass_agent::{ChatCompleter, ConversationEngine};
    use compass_core::dialogue::states::ChatMessage;
    use compass_core::leadership::{LeadershipFeatures, LeadershipModel, TrainingSample};
    use compass_db::{
        connect_with_settings, migrations, DbPool, DemoDataset, EmployeeRepository,
        SqlEmployeeRepository,
    };

    use super::{router, ApiState};

    struct StubCompleter;

    #[async_trait]
    impl ChatCompleter for StubCompleter {
        async fn complete(&self, _system: &str, _history: &[ChatMessage]) -> Result<String> {
            Ok("canned reply".to_string())
        }
    }

    fn trained_scorer() -> LeadershipModel {
        let mut samples = Vec::new();
        for offset in 0..6 {
            samples.push(TrainingSample {
                features: LeadershipFeatures {
                    tenure_days: 3000 + offset * 100,
                    promotions: 2,
                    skill_count: 7,
                },
                is_leader: true,
            });
            samples.push(TrainingSample {
                features: LeadershipFeatures {
                    tenure_days: 400 + offset * 50,
                    promotions: 0,
                    skill_count: 2,
                },
                is_leader: false,
            });
        }
        LeadershipModel::train("test", &samples).expect("training set is non-empty")
    }

    async fn seeded_state(name: &str, scorer: Option<LeadershipModel>) -> (ApiState, DbPool) {
        let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
        let pool = connect_with_settings(&url, 1, 5).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        DemoDataset::load(&pool).await.expect("fixtures should load");

        let directory: Arc<dyn EmployeeRepository> =
            Arc::new(SqlEmployeeRepository::new(pool.clone()));
        let engine = Arc::new(ConversationEngine::new(
            directory.clone(),
            Arc::new(StubCompleter),
            scorer,
        ));
        (ApiState::new(engine, directory), pool)
    }

    async fn call(state: ApiState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.expect("router should respond");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let payload = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, payload)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request should build")
    }

    #[tokio::test]
    async fn chat_turn_greets_returning_employee() {
        let (state, pool) = seeded_state("routes_greet", None).await;

        let (status, payload) = call(
            state,
            post_json("/api/chatbot", json!({"message": "hello", "employee_id": "E001"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(payload["reply"].as_str().unwrap().contains("Welcome back"));
        assert_eq!(payload["next_state"], "MAIN_MENU");
        pool.close().await;
    }

    #[tokio::test]
    async fn chat_turn_unknown_state_tag_gets_fallback_reply() {
        let (state, pool) = seeded_state("routes_unknown_state", None).await;

        // "2" must not open the upskilling branch from an unrecognized state.
        let (status, payload) = call(
            state,
            post_json(
                "/api/chatbot",
                json!({"message": "2", "employee_id": "E001", "state": "NOT_A_STATE"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(payload["reply"].as_str().unwrap().contains("not sure how to handle"));
        assert_eq!(payload["next_state"], "MAIN_MENU");
        pool.close().await;
    }

    #[tokio::test]
    async fn chat_turn_maps_missing_scorer_to_service_unavailable() {
        let (state, pool) = seeded_state("routes_scorer_missing", None).await;

        let (status, payload) = call(
            state,
            post_json(
                "/api/chatbot",
                json!({"message": "3", "employee_id": "E001", "state": "MAIN_MENU"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(payload["correlation_id"].as_str().is_some());
        pool.close().await;
    }

    #[tokio::test]
    async fn employee_profile_and_not_found() {
        let (state, pool) = seeded_state("routes_profile", None).await;

        let (status, payload) =
            call(state.clone(), get_request("/api/employee/E001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["name"], "Aisha Rahman");

        let (status, _) = call(state, get_request("/api/employee/E999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        pool.close().await;
    }

    #[tokio::test]
    async fn career_recommendations_are_capped_and_shaped() {
        let (state, pool) = seeded_state("routes_recommendations", None).await;

        let (status, payload) =
            call(state, get_request("/api/employee/E002/career_recommendations")).await;

        assert_eq!(status, StatusCode::OK);
        let recommendations = payload["recommendations"].as_array().expect("array");
        assert!(!recommendations.is_empty());
        assert!(recommendations.len() <= 3);
        for entry in recommendations {
            assert!(entry["recommended_role"].as_str().is_some());
            let pct = entry["skill_overlap_pct"].as_f64().expect("percentage");
            assert!((0.0..=100.0).contains(&pct));
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn leadership_endpoint_scores_or_reports_unavailable() {
        let (state, pool) = seeded_state("routes_leadership", Some(trained_scorer())).await;

        let (status, payload) =
            call(state.clone(), get_request("/api/employee/E001/leadership_potential")).await;
        assert_eq!(status, StatusCode::OK);
        let score = payload["score"].as_u64().expect("score");
        assert!(score <= 100);
        assert_eq!(payload["factors"].as_array().expect("factors").len(), 3);

        let (status, _) =
            call(state, get_request("/api/employee/E999/leadership_potential")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        pool.close().await;

        let (unloaded, pool) = seeded_state("routes_leadership_unloaded", None).await;
        let (status, _) =
            call(unloaded, get_request("/api/employee/E001/leadership_potential")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        pool.close().await;
    }

    #[tokio::test]
    async fn update_then_details_round_trip() {
        let (state, pool) = seeded_state("routes_update", None).await;

        let (status, payload) = call(
            state.clone(),
            post_json(
                "/api/employee/E002/update",
                json!({
                    "skills": ["Kubernetes", "Go"],
                    "experiences": [{
                        "kind": "Program",
                        "organization": "PSA Singapore",
                        "program": "Cloud Bootcamp",
                        "start_date": "2024-02-05",
                        "end_date": null,
                        "focus": "Platform engineering"
                    }]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "updated");

        let (status, payload) =
            call(state, get_request("/api/employee/E002/details")).await;
        assert_eq!(status, StatusCode::OK);
        let skills = payload["skills"].as_array().expect("skills");
        assert_eq!(skills.len(), 2);
        assert_eq!(payload["experiences"][0]["program"], "Cloud Bootcamp");
        pool.close().await;
    }
}

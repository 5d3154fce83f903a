//! Liveness/readiness endpoint served on a dedicated port so load balancers
//! can probe it without touching the API surface.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use compass_db::DbPool;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    scorer_loaded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub status: &'static str,
    pub detail: String,
}

/// Readiness hinges on the database; the scorer check is informational since
/// the chat surface runs without it (scoring paths return 503).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: CheckOutcome,
    pub scorer: CheckOutcome,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, scorer_loaded: bool) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { db_pool, scorer_loaded })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    db_pool: DbPool,
    scorer_loaded: bool,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(db_pool, scorer_loaded)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let scorer = if state.scorer_loaded {
        CheckOutcome { status: "loaded", detail: "leadership model is loaded".to_string() }
    } else {
        CheckOutcome {
            status: "unloaded",
            detail: "leadership model is not loaded; scoring paths return 503".to_string(),
        }
    };

    let report = HealthReport {
        status: if ready { "ready" } else { "degraded" },
        database,
        scorer,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(report))
}

async fn database_check(pool: &DbPool) -> CheckOutcome {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => CheckOutcome { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            CheckOutcome { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

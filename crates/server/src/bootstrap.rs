use std::sync::Arc;

use compass_agent::{ConversationEngine, OpenAiChatClient};
use compass_core::config::{AppConfig, ConfigError, LoadOptions};
use compass_core::leadership::LeadershipModel;
use compass_db::{
    connect_with_settings, migrations, DbPool, EmployeeRepository, SqlEmployeeRepository,
};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub directory: Arc<dyn EmployeeRepository>,
    pub engine: Arc<ConversationEngine>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("chat responder initialization failed: {0}")]
    Responder(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", correlation_id = "bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", correlation_id = "bootstrap");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", correlation_id = "bootstrap");

    let responder = OpenAiChatClient::new(&config.llm).map_err(BootstrapError::Responder)?;
    let scorer = load_scorer(&config).await;
    let directory: Arc<dyn EmployeeRepository> =
        Arc::new(SqlEmployeeRepository::new(db_pool.clone()));
    let engine =
        Arc::new(ConversationEngine::new(directory.clone(), Arc::new(responder), scorer));

    Ok(Application { config, db_pool, directory, engine })
}

/// Reads the fitted leadership model from disk. A missing or unreadable file
/// leaves the scorer unloaded rather than failing bootstrap; the API then
/// reports service-unavailable on the scoring paths.
async fn load_scorer(config: &AppConfig) -> Option<LeadershipModel> {
    let path = &config.model.path;
    let payload = match tokio::fs::read_to_string(path).await {
        Ok(payload) => payload,
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.scorer_missing",
                correlation_id = "bootstrap",
                path = %path.display(),
                error = %error,
                "leadership model file not readable; scoring disabled"
            );
            return None;
        }
    };

    match LeadershipModel::from_json(&payload) {
        Ok(model) => {
            info!(
                event_name = "system.bootstrap.scorer_loaded",
                correlation_id = "bootstrap",
                version = %model.version,
            );
            Some(model)
        }
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.scorer_invalid",
                correlation_id = "bootstrap",
                path = %path.display(),
                error = %error,
                "leadership model file did not parse; scoring disabled"
            );
            None
        }
    }
}

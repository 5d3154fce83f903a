use std::path::PathBuf;

use compass_core::leadership::LeadershipModel;
use compass_db::repositories::EmployeeRepository;
use compass_db::{connect_with_settings, migrations, SqlEmployeeRepository};

use crate::commands::{CommandContext, CommandResult};

/// Job titles containing any of these mark the employee as a leader for
/// training-label purposes.
const LEADER_KEYWORDS: &[&str] = &["Manager", "Lead", "Architect", "Head", "Director"];

const MODEL_VERSION: &str = "logreg-v1";

pub fn run(output: Option<PathBuf>) -> CommandResult {
    let ctx = match CommandContext::init("train") {
        Ok(ctx) => ctx,
        Err(result) => return *result,
    };

    let result = ctx.runtime.block_on(async {
        let pool = connect_with_settings(
            &ctx.config.database.url,
            ctx.config.database.max_connections,
            ctx.config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let repository = SqlEmployeeRepository::new(pool.clone());
        let samples = repository
            .training_samples(LEADER_KEYWORDS)
            .await
            .map_err(|error| ("training_data", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(samples)
    });

    let samples = match result {
        Ok(samples) => samples,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("train", error_class, message, exit_code);
        }
    };

    let model = match LeadershipModel::train(MODEL_VERSION, &samples) {
        Ok(model) => model,
        Err(error) => {
            return CommandResult::failure("train", "empty_training_set", error.to_string(), 7);
        }
    };

    let payload = match model.to_json() {
        Ok(payload) => payload,
        Err(error) => {
            return CommandResult::failure("train", "serialization", error.to_string(), 8);
        }
    };

    let path = output.unwrap_or_else(|| ctx.config.model.path.clone());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                return CommandResult::failure("train", "model_write", error.to_string(), 9);
            }
        }
    }
    if let Err(error) = std::fs::write(&path, payload) {
        return CommandResult::failure("train", "model_write", error.to_string(), 9);
    }

    CommandResult::success(
        "train",
        format!(
            "fitted {} on {} samples (training accuracy {:.2}); wrote {}",
            model.version,
            model.training_samples,
            model.accuracy,
            path.display()
        ),
    )
}

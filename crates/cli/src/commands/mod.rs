pub mod doctor;
pub mod migrate;
pub mod seed;
pub mod train;

use compass_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Validated config plus a current-thread runtime, shared by every command
/// that touches the database.
pub(crate) struct CommandContext {
    pub config: AppConfig,
    pub runtime: tokio::runtime::Runtime,
}

impl CommandContext {
    pub fn init(command: &str) -> Result<Self, Box<CommandResult>> {
        let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
            Box::new(CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            ))
        })?;

        let runtime =
            tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
                |error| {
                    Box::new(CommandResult::failure(
                        command,
                        "runtime_init",
                        format!("failed to initialize async runtime: {error}"),
                        3,
                    ))
                },
            )?;

        Ok(Self { config, runtime })
    }
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn success_outcomes_are_json_with_ok_status() {
        let result = CommandResult::success("seed", "loaded 5 employees");
        assert_eq!(result.exit_code, 0);
        let value: serde_json::Value =
            serde_json::from_str(&result.output).expect("output should be JSON");
        assert_eq!(value["command"], "seed");
        assert_eq!(value["status"], "ok");
        assert!(value["error_class"].is_null());
    }

    #[test]
    fn failure_outcomes_carry_class_and_exit_code() {
        let result = CommandResult::failure("train", "empty_training_set", "no employees", 5);
        assert_eq!(result.exit_code, 5);
        let value: serde_json::Value =
            serde_json::from_str(&result.output).expect("output should be JSON");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error_class"], "empty_training_set");
    }
}

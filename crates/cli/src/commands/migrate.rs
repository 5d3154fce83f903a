use compass_db::{connect_with_settings, migrations};

use crate::commands::{CommandContext, CommandResult};

pub fn run() -> CommandResult {
    let ctx = match CommandContext::init("migrate") {
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

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<i64, (&'static str, String, u8)>(applied)
    });

    match result {
        Ok(applied) => CommandResult::success(
            "migrate",
            format!("schema is current ({applied} migrations applied)"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

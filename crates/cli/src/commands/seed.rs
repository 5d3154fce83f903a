use compass_db::{connect_with_settings, migrations, DemoDataset};

use crate::commands::{CommandContext, CommandResult};

pub fn run() -> CommandResult {
    let ctx = match CommandContext::init("seed") {
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

        let counts = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(counts)
    });

    match result {
        Ok(counts) => CommandResult::success(
            "seed",
            format!(
                "demo directory ready: {} employees, {} skills, {} specializations",
                counts.employees, counts.skills, counts.specializations
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

//! `coolforum-migrate` -- one-shot import of a legacy CoolForum dataset.
//!
//! Reads the five export files from the data directory, writes them into
//! the forum store, reconciles derived state, cleans up accounts and resets
//! id sequences. The report is logged as JSON when the run completes.
//!
//! # Environment variables
//!
//! | Variable                   | Required | Default          | Description                        |
//! |----------------------------|----------|------------------|------------------------------------|
//! | `DATABASE_URL`             | yes      | --               | Postgres connection string         |
//! | `MIGRATION_DATA_DIR`       | no       | `util/data`      | Directory holding the exports      |
//! | `NEW_USERS_FILE`           | no       | `new_users.json` | Side file for issued credentials   |
//! | `DATABASE_MAX_CONNECTIONS` | no       | `5`              | Connection pool size               |
//! | `LOG_FORMAT`               | no       | `text`           | `json` for one JSON object per line |

use coolforum_pipeline::config::PipelineConfig;
use coolforum_pipeline::error::MigrateResult;
use coolforum_pipeline::report::MigrationReport;
use coolforum_pipeline::Pipeline;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coolforum_pipeline=info,sqlx=warn".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    match run().await {
        Ok(report) => match serde_json::to_string(&report) {
            Ok(json) => tracing::info!(report = %json, "Migration complete"),
            Err(e) => tracing::warn!(error = %e, "Migration complete; report not serialisable"),
        },
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            std::process::exit(1);
        }
    }
}

async fn run() -> MigrateResult<MigrationReport> {
    let config = PipelineConfig::from_env()?;

    let pool = coolforum_db::create_pool(&config.database_url, config.max_connections).await?;
    coolforum_db::health_check(&pool).await?;
    tracing::info!("Database connection established");

    coolforum_db::run_migrations(&pool).await?;
    tracing::info!("Forum schema up to date");

    tracing::info!(
        categories = %config.files.categories.display(),
        credentials = %config.new_users_file.display(),
        "Starting migration"
    );

    Pipeline::new(pool, config.files, config.new_users_file, config.migration)
        .run()
        .await
}

//! Database module
//!
//! Database connection and schema utilities.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

/// Tables created by `migrations/0001_initial.sql`
const REQUIRED_TABLES: &[&str] = &[
    "categories",
    "courses",
    "course_prerequisites",
    "course_modules",
    "lessons",
    "assignments",
    "enrollments",
    "lesson_completions",
    "module_milestones",
    "certificates",
    "notifications",
    "submissions",
    "comments",
];

/// Open the connection pool
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!(table = %table, "Required table does not exist. Apply migrations/0001_initial.sql");
            return Ok(false);
        }
    }

    tracing::info!(tables = REQUIRED_TABLES.len(), "Schema verified");
    Ok(true)
}

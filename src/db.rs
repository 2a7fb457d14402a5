//! PostgreSQL connection pool and schema setup.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Settings;

/// Open the connection pool and bring the schema up to date.
pub async fn connect(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database.url())
        .await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

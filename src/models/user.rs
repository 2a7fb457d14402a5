//! The user record, the only entity this application stores.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Marker stored in `password_hash` for accounts created through federated
/// login. Such accounts have no local password; the marker is not a valid
/// PHC string and never verifies.
pub const FEDERATED_PASSWORD_SENTINEL: &str = "google";

/// A row of the `users` table. `email` is the primary key; `secret` stays
/// null until the owner submits one.
///
/// The record is also what gets serialized into the session on sign-in,
/// hence the serde derives.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password_hash: String,
    pub secret: Option<String>,
}

impl User {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT email, password_hash, secret FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new record. Uniqueness is enforced by the primary key rather
    /// than a prior lookup, so two concurrent registrations cannot both
    /// succeed; the loser observes `Ok(None)`.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING email, password_hash, secret",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(pool)
        .await
    }

    /// Replace the secret of the record owned by `email`.
    pub async fn set_secret(pool: &PgPool, email: &str, secret: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET secret = $1 WHERE email = $2")
            .bind(secret)
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }
}

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::views;

/// Application-level failures. Every handler returns `Result<_, AppError>` so
/// that no path can drop a request without a response; the `IntoResponse`
/// impl logs the failure server-side and renders a plain 500 page with no
/// detail leaked to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("oauth error: {0}")]
    Oauth(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(views::internal_error()),
        )
            .into_response()
    }
}

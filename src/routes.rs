//! HTTP surface: route handlers and router assembly.
//!
//! Handlers are thin: they restore the request-scoped identity from the
//! session, branch on it, and delegate to the auth strategies and the user
//! model. Every path ends in a view, a redirect, or an error status — there
//! is no silent-drop branch.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use crate::auth::session::{current_user, sign_in, sign_out};
use crate::auth::{local, GoogleOauth, LocalAuthOutcome};
use crate::error::AppError;
use crate::models::User;
use crate::settings::Settings;
use crate::views;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub oauth: GoogleOauth,
}

/// Submitted by the login and registration forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    /// The email address; the form field keeps its historical name.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SecretForm {
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct OauthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Build the application router, including the session layer. Sessions live
/// in process memory and ride on a signed cookie.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_signed(Key::derive_from(settings.session.secret.as_bytes()));

    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
        .route("/secrets", get(secrets))
        .route("/submit", get(submit_page).post(submit))
        .route("/auth/google", get(google_begin))
        .route("/auth/google/secrets", get(google_callback))
        .layer(session_layer)
        .with_state(state)
}

async fn home() -> Html<String> {
    Html(views::home())
}

async fn login_page() -> Html<String> {
    Html(views::login())
}

async fn register_page() -> Html<String> {
    Html(views::register())
}

async fn logout(session: Session) -> Result<Redirect, AppError> {
    sign_out(&session).await?;
    Ok(Redirect::to("/"))
}

async fn secrets(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let Some(user) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    // Read the secret fresh so a long-lived session never shows a stale one.
    let secret = User::find_by_email(&state.pool, &user.email)
        .await?
        .and_then(|u| u.secret)
        .unwrap_or_else(|| views::DEFAULT_SECRET.to_string());

    Ok(Html(views::secrets(&secret)).into_response())
}

async fn submit_page(session: Session) -> Result<Response, AppError> {
    if current_user(&session).await?.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }
    Ok(Html(views::submit()).into_response())
}

async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SecretForm>,
) -> Result<Response, AppError> {
    let Some(user) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    User::set_secret(&state.pool, &user.email, &form.secret).await?;
    Ok(Redirect::to("/secrets").into_response())
}

async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let password_hash =
        crate::auth::password::hash_password(&form.password).map_err(AppError::PasswordHash)?;

    match User::create(&state.pool, &form.username, &password_hash).await? {
        Some(user) => {
            sign_in(&session, &user).await?;
            Ok(Redirect::to("/secrets").into_response())
        }
        None => {
            tracing::info!(email = %form.username, "duplicate registration");
            Ok(Html(views::duplicate_email()).into_response())
        }
    }
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match local::authenticate(&state.pool, &form.username, &form.password).await? {
        LocalAuthOutcome::Authenticated(user) => {
            sign_in(&session, &user).await?;
            Ok(Redirect::to("/secrets").into_response())
        }
        outcome @ (LocalAuthOutcome::UnknownUser | LocalAuthOutcome::WrongPassword) => {
            tracing::debug!(email = %form.username, ?outcome, "login rejected");
            Ok(Redirect::to("/login").into_response())
        }
    }
}

async fn google_begin(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, AppError> {
    let url = state.oauth.begin(&session).await?;
    Ok(Redirect::to(&url))
}

/// OAuth callback. Any handshake failure redirects to the login page; no
/// provider error detail reaches the client.
async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<OauthCallbackParams>,
) -> Redirect {
    let (Some(code), Some(csrf_state)) = (params.code, params.state) else {
        tracing::warn!("oauth callback missing code or state");
        return Redirect::to("/login");
    };

    let user = match state
        .oauth
        .finish(&session, &state.pool, &code, &csrf_state)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "federated login failed");
            return Redirect::to("/login");
        }
    };

    match sign_in(&session, &user).await {
        Ok(()) => Redirect::to("/secrets"),
        Err(e) => {
            tracing::error!(error = %e, "failed to establish session");
            Redirect::to("/login")
        }
    }
}

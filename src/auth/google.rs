//! Federated authentication via Google OAuth 2.0.
//!
//! Implements the Authorization Code flow with PKCE:
//!
//! 1. [`GoogleOauth::begin`] builds an authorization URL requesting the
//!    `email` and `profile` scopes, generates a random CSRF state and PKCE
//!    challenge, and parks state + verifier in the caller's session.
//! 2. [`GoogleOauth::finish`] consumes the parked values (a state can only
//!    be redeemed once), exchanges the authorization code for an access
//!    token, fetches the profile from the Google userinfo endpoint, and
//!    resolves the profile email to a `users` row — reusing an existing row
//!    or creating one with the sentinel password marker.
//!
//! No password verification happens on this path; trust is delegated to the
//! provider's handshake.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use sqlx::PgPool;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{User, FEDERATED_PASSWORD_SENTINEL};
use crate::settings::Settings;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Session keys for the in-flight handshake.
const STATE_KEY: &str = "oauth.google.state";
const PKCE_KEY: &str = "oauth.google.pkce";

/// Google user info from the userinfo API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    email: String,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler, cheap to clone into the router state.
#[derive(Debug, Clone)]
pub struct GoogleOauth {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl GoogleOauth {
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self {
            client_id: ClientId::new(settings.google.id.clone()),
            client_secret: ClientSecret::new(settings.google.secret.clone()),
            auth_url: AuthUrl::new(AUTH_URL.to_string())
                .map_err(|e| AppError::Oauth(format!("invalid auth url: {e}")))?,
            token_url: TokenUrl::new(TOKEN_URL.to_string())
                .map_err(|e| AppError::Oauth(format!("invalid token url: {e}")))?,
            redirect_url: RedirectUrl::new(settings.auth.redirect.clone())
                .map_err(|e| AppError::Oauth(format!("invalid redirect url: {e}")))?,
        })
    }

    fn client(&self) -> ConfiguredClient {
        BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
    }

    /// Start the handshake: returns the authorization URL to redirect the
    /// browser to, with CSRF state and PKCE verifier parked in the session.
    pub async fn begin(&self, session: &Session) -> Result<String, AppError> {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = self
            .client()
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        session.insert(STATE_KEY, csrf_state.secret()).await?;
        session.insert(PKCE_KEY, pkce_verifier.secret()).await?;

        Ok(auth_url.to_string())
    }

    /// Complete the handshake from the callback query parameters and return
    /// the resolved user record.
    pub async fn finish(
        &self,
        session: &Session,
        pool: &PgPool,
        code: &str,
        state: &str,
    ) -> Result<User, AppError> {
        let expected_state: Option<String> = session.remove(STATE_KEY).await?;
        let pkce_verifier: Option<String> = session.remove(PKCE_KEY).await?;

        let (Some(expected_state), Some(pkce_verifier)) = (expected_state, pkce_verifier) else {
            return Err(AppError::Oauth("no handshake in progress".into()));
        };
        if expected_state != state {
            return Err(AppError::Oauth("state mismatch".into()));
        }

        // Token exchange must not follow redirects.
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let token = self
            .client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| AppError::Oauth(format!("token exchange failed: {e}")))?;

        let profile: GoogleUser = http_client
            .get(USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        resolve_user(pool, &profile.email).await
    }
}

/// Map a provider-asserted email onto a `users` row: reuse the existing
/// record if there is one, otherwise create a federated-only record. The
/// insert is conflict-tolerant, so a concurrent first login for the same
/// email still ends with exactly one row.
pub async fn resolve_user(pool: &PgPool, email: &str) -> Result<User, AppError> {
    if let Some(user) = User::find_by_email(pool, email).await? {
        return Ok(user);
    }
    match User::create(pool, email, FEDERATED_PASSWORD_SENTINEL).await? {
        Some(user) => Ok(user),
        // Lost the race against another login; the row exists now.
        None => User::find_by_email(pool, email)
            .await?
            .ok_or_else(|| AppError::Oauth("user vanished during federated login".into())),
    }
}

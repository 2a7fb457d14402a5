//! Local (email + password) authentication strategy.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{User, FEDERATED_PASSWORD_SENTINEL};

use super::password::verify_password;

/// Outcome of a local authentication attempt. Failures are signals the
/// caller redirects on, not errors; only infrastructure problems (query
/// failure, malformed stored hash) come back as [`AppError`].
#[derive(Debug)]
pub enum LocalAuthOutcome {
    Authenticated(User),
    UnknownUser,
    WrongPassword,
}

/// Verify a submitted email/password pair against the store.
///
/// Accounts created through federated login carry the sentinel marker
/// instead of a hash and can never authenticate locally; they report
/// `WrongPassword` rather than tripping the malformed-hash error path.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<LocalAuthOutcome, AppError> {
    let Some(user) = User::find_by_email(pool, email).await? else {
        return Ok(LocalAuthOutcome::UnknownUser);
    };

    if user.password_hash == FEDERATED_PASSWORD_SENTINEL {
        return Ok(LocalAuthOutcome::WrongPassword);
    }

    if verify_password(password, &user.password_hash).map_err(AppError::PasswordHash)? {
        Ok(LocalAuthOutcome::Authenticated(user))
    } else {
        Ok(LocalAuthOutcome::WrongPassword)
    }
}

//! Session management: the bridge between an authenticated identity and the
//! cookie-keyed server-side session record.

use time::{Duration, OffsetDateTime};
use tower_sessions::{session, Expiry, Session};

use crate::models::User;

/// Key under which the authenticated user record is stored in the session.
pub const SESSION_USER_KEY: &str = "auth.user";

/// Sessions expire 24 hours after sign-in, regardless of activity.
const SESSION_TTL: Duration = Duration::hours(24);

/// Serialize `user` into the session and set the absolute expiry. The
/// session id is cycled first so a pre-auth session id never survives into
/// an authenticated one.
pub async fn sign_in(session: &Session, user: &User) -> Result<(), session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user).await?;
    session.set_expiry(Some(Expiry::AtDateTime(OffsetDateTime::now_utc() + SESSION_TTL)));
    Ok(())
}

/// The "is authenticated" predicate: the identity restored from the session
/// cookie, if any. Handlers branch on this.
pub async fn current_user(session: &Session) -> Result<Option<User>, session::Error> {
    session.get(SESSION_USER_KEY).await
}

/// Terminate the session: the server-side record is deleted and the cookie
/// cleared, so the identity cannot be restored afterwards.
pub async fn sign_out(session: &Session) -> Result<(), session::Error> {
    session.flush().await
}

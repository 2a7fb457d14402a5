//! Store-backed tests. `#[sqlx::test]` provisions an isolated database per
//! test and applies `./migrations`, so each test starts from an empty
//! `users` table.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use secretkeeper::auth::google::resolve_user;
use secretkeeper::auth::local::{authenticate, LocalAuthOutcome};
use secretkeeper::auth::password::hash_password;
use secretkeeper::auth::GoogleOauth;
use secretkeeper::models::{User, FEDERATED_PASSWORD_SENTINEL};
use secretkeeper::routes::{app, AppState};
use secretkeeper::settings::Settings;
use secretkeeper::views;

fn test_app(pool: PgPool) -> Router {
    let settings = Settings::default();
    let oauth = GoogleOauth::from_settings(&settings).expect("oauth config");
    app(AppState { pool, oauth }, &settings)
}

fn form_post(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX).await.expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ascii Location")
}

/// The `id=...` pair from the Set-Cookie header, for replay on a follow-up
/// request.
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .expect("ascii cookie")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn user_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .expect("count users")
}

#[sqlx::test]
async fn duplicate_registration_creates_no_second_row(pool: PgPool) {
    let app = test_app(pool.clone());

    let first = app
        .clone()
        .oneshot(form_post("/register", "username=a@x.com&password=pw1"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/secrets");

    let second = app
        .oneshot(form_post("/register", "username=a@x.com&password=other"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let body = body_string(second.into_body()).await;
    assert!(body.contains(views::DUPLICATE_EMAIL_MESSAGE));

    assert_eq!(user_count(&pool).await, 1);
}

#[sqlx::test]
async fn login_route_accepts_correct_and_rejects_wrong_password(pool: PgPool) {
    let hash = hash_password("pw1").unwrap();
    User::create(&pool, "a@x.com", &hash).await.unwrap();

    let app = test_app(pool);

    let good = app
        .clone()
        .oneshot(form_post("/login", "username=a@x.com&password=pw1"))
        .await
        .unwrap();
    assert_eq!(good.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&good), "/secrets");

    let bad = app
        .oneshot(form_post("/login", "username=a@x.com&password=pw2"))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&bad), "/login");
}

#[sqlx::test]
async fn local_authenticate_outcomes(pool: PgPool) {
    let hash = hash_password("pw1").unwrap();
    User::create(&pool, "a@x.com", &hash).await.unwrap();
    User::create(&pool, "fed@x.com", FEDERATED_PASSWORD_SENTINEL)
        .await
        .unwrap();

    let outcome = authenticate(&pool, "nobody@x.com", "pw1").await.unwrap();
    assert!(matches!(outcome, LocalAuthOutcome::UnknownUser));

    let outcome = authenticate(&pool, "a@x.com", "wrong").await.unwrap();
    assert!(matches!(outcome, LocalAuthOutcome::WrongPassword));

    let outcome = authenticate(&pool, "a@x.com", "pw1").await.unwrap();
    match outcome {
        LocalAuthOutcome::Authenticated(user) => assert_eq!(user.email, "a@x.com"),
        other => panic!("expected Authenticated, got {other:?}"),
    }

    // A federated-only account holds the sentinel marker, not a hash; it
    // must come back as an ordinary rejection, not a malformed-hash error.
    let outcome = authenticate(&pool, "fed@x.com", "google").await.unwrap();
    assert!(matches!(outcome, LocalAuthOutcome::WrongPassword));
}

#[sqlx::test]
async fn set_secret_updates_only_the_owning_row(pool: PgPool) {
    let hash = hash_password("pw1").unwrap();
    User::create(&pool, "a@x.com", &hash).await.unwrap();
    User::create(&pool, "b@x.com", &hash).await.unwrap();

    User::set_secret(&pool, "a@x.com", "hello").await.unwrap();

    let a = User::find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
    let b = User::find_by_email(&pool, "b@x.com").await.unwrap().unwrap();
    assert_eq!(a.secret.as_deref(), Some("hello"));
    assert_eq!(b.secret, None);
}

#[sqlx::test]
async fn federated_resolution_reuses_existing_row(pool: PgPool) {
    let hash = hash_password("pw1").unwrap();
    User::create(&pool, "a@x.com", &hash).await.unwrap();

    let user = resolve_user(&pool, "a@x.com").await.unwrap();
    assert_eq!(user.email, "a@x.com");
    // The local account is reused as-is; no sentinel overwrite.
    assert_eq!(user.password_hash, hash);
    assert_eq!(user_count(&pool).await, 1);
}

#[sqlx::test]
async fn federated_resolution_creates_exactly_one_sentinel_row(pool: PgPool) {
    let user = resolve_user(&pool, "new@x.com").await.unwrap();
    assert_eq!(user.email, "new@x.com");
    assert_eq!(user.password_hash, FEDERATED_PASSWORD_SENTINEL);
    assert_eq!(user_count(&pool).await, 1);

    // A returning federated login resolves to the same single row.
    let again = resolve_user(&pool, "new@x.com").await.unwrap();
    assert_eq!(again.email, "new@x.com");
    assert_eq!(user_count(&pool).await, 1);
}

/// End-to-end: register, view the placeholder, submit a secret, view it.
#[sqlx::test]
async fn register_then_submit_then_view_secret(pool: PgPool) {
    let app = test_app(pool);

    let unauthenticated = app
        .clone()
        .oneshot(Request::get("/secrets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(location(&unauthenticated), "/login");

    let registered = app
        .clone()
        .oneshot(form_post("/register", "username=a@x.com&password=pw1"))
        .await
        .unwrap();
    assert_eq!(location(&registered), "/secrets");
    let cookie = session_cookie(&registered);

    let secrets = app
        .clone()
        .oneshot(
            Request::get("/secrets")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(secrets.status(), StatusCode::OK);
    let body = body_string(secrets.into_body()).await;
    assert!(body.contains(views::DEFAULT_SECRET));

    let submitted = app
        .clone()
        .oneshot(
            Request::post("/submit")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from("secret=hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(submitted.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&submitted), "/secrets");

    let secrets = app
        .oneshot(
            Request::get("/secrets")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_string(secrets.into_body()).await;
    assert!(body.contains("hello"));
    assert!(!body.contains(views::DEFAULT_SECRET));
}

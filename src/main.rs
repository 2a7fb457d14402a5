use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use secretkeeper::auth::GoogleOauth;
use secretkeeper::db;
use secretkeeper::routes::{app, AppState};
use secretkeeper::settings::Settings;

fn init_tracing() {
    // RUST_LOG controls the level (e.g. RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::new()?;
    anyhow::ensure!(
        settings.session.secret.len() >= 32,
        "session.secret must be at least 32 bytes"
    );

    let pool = db::connect(&settings).await?;
    let oauth = GoogleOauth::from_settings(&settings)?;

    let router = app(AppState { pool, oauth }, &settings);

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}

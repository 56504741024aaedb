use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use campus_auth::app_state::AppState;
use campus_auth::config::Settings;
use campus_auth::http;
use campus_auth::security::jwt::TokenCodec;
use campus_auth::services::{AuthService, SmtpNotifier};
use campus_auth::store::{CredentialStore, PgCredentialStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting campus-auth");

    // Misconfiguration (missing or non-distinct token secrets) is fatal here
    let settings = Settings::load().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to database")?;

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool));
    let codec = TokenCodec::new(&settings.tokens);
    let notifier = Arc::new(
        SmtpNotifier::new(&settings.email).context("Failed to configure email transport")?,
    );

    let auth = AuthService::new(store.clone(), codec.clone(), notifier);
    let state = web::Data::new(AppState::new(auth, store, codec));

    let bind_addr = (settings.server.host.clone(), settings.server.port);
    tracing::info!(host = %settings.server.host, port = settings.server.port, "HTTP server listening");

    let cors_origins = settings.cors.allowed_origins.clone();
    HttpServer::new(move || {
        // Cookie credentials require an explicit origin allow-list
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(http::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

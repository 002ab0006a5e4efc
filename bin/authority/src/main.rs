use coursephase_access::{RoleResolver, TokenVerifier};
use coursephase_authority::app::{AppState, build_router};
use coursephase_authority::config::AuthorityConfig;
use coursephase_authority::service::CoursePhaseService;
use coursephase_authority::store::PostgresStore;
use coursephase_web::AuthState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AuthorityConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Signing keys are fetched once and kept for the life of the process.
    tracing::info!("Loading identity provider keys...");
    let verifier = TokenVerifier::discover(&config.keycloak)
        .await
        .expect("failed to load identity provider keys");

    let state = AppState {
        auth: Arc::new(AuthState::new(
            verifier,
            RoleResolver::new(config.keycloak.client_id()),
        )),
        service: Arc::new(CoursePhaseService::new(Arc::new(PostgresStore::new(
            db_pool,
        )))),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

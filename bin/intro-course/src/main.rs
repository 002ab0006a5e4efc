use coursephase_access::{RoleResolver, TokenVerifier};
use coursephase_authority_client::AuthorityClient;
use coursephase_intro_course::app::build_router;
use coursephase_intro_course::config::IntroCourseConfig;
use coursephase_web::AuthState;
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
    let config = IntroCourseConfig::from_env().expect("failed to load configuration");
    tracing::info!(
        authority = config.authority.base_url(),
        timeout_seconds = config.authority.timeout().as_secs(),
        "Loaded configuration"
    );

    // Signing keys are fetched once and kept for the life of the process.
    tracing::info!("Loading identity provider keys...");
    let verifier = TokenVerifier::discover(&config.keycloak)
        .await
        .expect("failed to load identity provider keys");

    let authority =
        AuthorityClient::from_config(&config.authority).expect("failed to build authority client");

    let auth = Arc::new(AuthState::new(
        verifier,
        RoleResolver::new(config.keycloak.client_id()),
    ));
    let app = build_router(auth, Arc::new(authority));

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

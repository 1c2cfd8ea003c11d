use axum::http::{HeaderValue, Method};
use codespace::{
    app_router,
    room::{generators::RandomTokenGenerator, start_cleanup_task, RoomRegistry, SessionCoordinator},
    AppError, AppState, Config, ConnectionManager, InMemoryConnectionManager,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codespace=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting codespace collaboration server");

    let config = Config::load()?;

    let connection_manager: Arc<dyn ConnectionManager> = Arc::new(InMemoryConnectionManager::new());
    let registry = RoomRegistry::new(
        config.registry_limits(),
        Box::new(RandomTokenGenerator::new(config.token_len)),
    );
    let coordinator = Arc::new(SessionCoordinator::new(registry, connection_manager.clone()));

    tokio::spawn(start_cleanup_task(
        coordinator.clone(),
        config.cleanup_config(),
    ));

    let app_state = AppState::new(coordinator, connection_manager);

    let app = app_router(app_state)
        .layer(cors_layer(config.allowed_origin()?))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    info!(address = %listener.local_addr()?, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origin: Option<HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    match origin {
        Some(origin) => layer.allow_origin(origin),
        None => {
            warn!("CODESPACE_CORS_ORIGIN unset, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}

//! Router construction and the server run loop.

use std::{future::Future, path::Path, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::{ServerConfig, SessionSettings},
    error::ServerError,
    infrastructure::repository::{InMemoryRoomRegistry, SqliteMessageRepository},
    ui::{
        handler::{get_history, get_rooms, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Build the application router.
///
/// `static_dir` is mounted as the fallback only when it exists.
pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/history", get(get_history))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .with_state(state);

    let router = match static_dir {
        Some(dir) if dir.is_dir() => {
            tracing::info!("Serving static files from '{}'", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            tracing::warn!(
                "Static directory '{}' not found, not serving static files",
                dir.display()
            );
            router
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    static_dir: Option<&Path>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, static_dir);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// Open the message log, bind, and serve until Ctrl-C or SIGTERM
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let repository = Arc::new(SqliteMessageRepository::connect(&config.database_url).await?);
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let state = Arc::new(AppState::new(
        registry,
        repository.clone(),
        SessionSettings::from(&config),
    ));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!("Listening on {}", address);

    let result = serve(
        listener,
        state,
        Some(config.static_dir.as_path()),
        shutdown_signal(),
    )
    .await;

    repository.close().await;
    tracing::info!("Server stopped");
    result
}

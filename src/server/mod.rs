use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerSettings;
use crate::storage::DictionaryStore;

pub mod error;
pub mod routes;

/// Lets a handler stop the server it runs in
#[derive(Debug, Clone, Default)]
pub struct ServerControl {
    token: CancellationToken,
}

impl ServerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once `stop` has been called
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

/// Server state
pub struct AppState {
    pub database_path: PathBuf,
    pub control: ServerControl,
}

impl AppState {
    /// Run `f` against a fresh connection on the blocking pool
    pub async fn with_store<T, F>(&self, f: F) -> crate::Result<T>
    where
        F: FnOnce(&mut DictionaryStore) -> crate::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.database_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut store = DictionaryStore::connect(&path)?;
            f(&mut store)
        })
        .await?
    }
}

pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/naj/", get(routes::search_all))
        .route("/naj/{*pattern}", get(routes::search))
        .route("/naj-classes", get(routes::list_classes))
        .route("/add/naj-class/{name}", post(routes::add_class))
        .route("/stop", get(routes::stop))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(error::render_error_page))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Reconcile the schema, bind, and serve until stopped
pub async fn start_server(settings: ServerSettings) -> anyhow::Result<()> {
    let database_path = settings.database_path.clone();
    let report = tokio::task::spawn_blocking(move || {
        DictionaryStore::open_and_sync(&database_path).map(|(_, report)| report)
    })
    .await??;
    tracing::info!(
        "Schema ready: {} created, {} altered, {} unchanged",
        report.created.len(),
        report.altered.len(),
        report.unchanged.len()
    );

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!("failed to bind {}: {}", addr, e)
    })?;

    let control = ServerControl::new();
    let on_ctrl_c = control.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.stop();
        }
    });

    tracing::info!("Starting server on {}", addr);
    crate::ui::success(&format!("Server listening on http://{}.", addr));

    serve(listener, settings.database_path, settings.static_dir, control).await
}

/// Serve on an already bound listener until `control` is stopped
pub async fn serve(
    listener: TcpListener,
    database_path: PathBuf,
    static_dir: PathBuf,
    control: ServerControl,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        database_path,
        control: control.clone(),
    });
    let app = create_router(state, &static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { control.stopped().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

//! HTTP surface: the single page, its forms, the image preview and the download.

use std::num::NonZeroU16;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::{error, info};

use crate::constants::{SESSION_IDLE_MINUTES, SESSION_PURGE_SECONDS};
use crate::model::VisionModel;

mod csrf;
mod flash;
mod markdown;
mod prelude;
mod store;
mod upload;
mod views;

use store::ExpiringStore;
use views::{
    credential_handler, generate_handler, graph_handler, lesson_download_handler, root_handler,
    styles_handler, upload_handler,
};

#[derive(Clone)]
pub(crate) struct AppState {
    model: Arc<dyn VisionModel>,
    max_upload_bytes: usize,
}

impl AppState {
    fn new(model: Arc<dyn VisionModel>, max_upload_bytes: usize) -> Self {
        Self {
            model,
            max_upload_bytes,
        }
    }
}

fn create_router(max_upload_bytes: usize, store: ExpiringStore) -> Router<AppState> {
    let session_layer = SessionManagerLayer::new(store)
        .with_name("graphlesson")
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_IDLE_MINUTES,
        )));

    Router::new()
        .route("/", axum::routing::get(root_handler))
        .route("/credential", axum::routing::post(credential_handler))
        .route("/upload", axum::routing::post(upload_handler))
        .route("/graph", axum::routing::get(graph_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route("/lesson.md", axum::routing::get(lesson_download_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(session_layer)
}

/// Serves the application on `listen_addr:port` until the server stops.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    max_upload_bytes: usize,
    model: Arc<dyn VisionModel>,
) -> Result<(), anyhow::Error> {
    let store = ExpiringStore::default();
    store.spawn_purge(Duration::from_secs(SESSION_PURGE_SECONDS));
    let app = create_router(max_upload_bytes, store)
        .with_state(AppState::new(model, max_upload_bytes));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}

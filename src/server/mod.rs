//! HTTP upload service.
//!
//! | Route          | Description |
//! |----------------|-------------|
//! | `GET /`        | Upload form |
//! | `GET /health`  | Liveness probe |
//! | `POST /upload` | Multipart field `files` (repeatable) → `presentation.pptx` |
//!
//! The whole deck is built on a blocking thread; the request body is capped
//! by [`DeckConfig::max_upload_bytes`].

mod error;

pub use error::ApiError;

use crate::config::DeckConfig;
use crate::convert::build_deck;
use crate::error::DeckError;
use crate::pipeline::input::UploadedFile;
use crate::pptx::PPTX_MIME_TYPE;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Multipart field carrying the uploaded files.
pub const FILES_FIELD: &str = "files";

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DeckConfig>,
}

/// Build the application router.
pub fn router(config: Arc<DeckConfig>) -> Router {
    let body_limit = config.max_upload_bytes;
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/upload", post(handle_upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { config })
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, config: Arc<DeckConfig>) -> std::io::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart?;
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        files.push(UploadedFile::new(filename, Vec::from(data)));
    }
    info!("Received {} file(s)", files.len());

    let config = Arc::clone(&state.config);
    let output = tokio::task::spawn_blocking(move || build_deck(files, &config))
        .await
        .map_err(|e| DeckError::Internal(format!("deck task failed: {}", e)))??;

    if !output.is_complete() {
        info!(
            "Deck built with {} skipped file(s)/page(s)",
            output.skipped.len()
        );
    }

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"presentation.pptx\"",
            ),
        ],
        output.bytes,
    )
        .into_response())
}

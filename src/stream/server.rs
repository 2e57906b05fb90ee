//! Axum server: page, MJPEG stream and status

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::cors::{Any, CorsLayer};

use super::mjpeg;
use super::shared::{SharedStateHandle, StatusResponse};

/// Page embedding the stream
const INDEX_HTML: &str = include_str!("index.html");

/// Create the router with all endpoints
pub fn create_router(state: SharedStateHandle) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/video_feed", get(video_feed_handler))
        .route("/api/status", get(status_handler))
        .with_state(state)
}

/// Run the server until `shutdown_rx` changes
///
/// Open streams end when the producer closes the frame channel, which lets
/// the graceful shutdown complete.
pub async fn run_server(
    port: u16,
    shared_state: SharedStateHandle,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(shared_state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Stream available at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
}

async fn status_handler(State(state): State<SharedStateHandle>) -> Json<StatusResponse> {
    Json(state.status())
}

async fn video_feed_handler(State(state): State<SharedStateHandle>) -> Response {
    let Some(rx) = state.subscribe() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Stream closed").into_response();
    };
    tracing::info!(viewers = state.viewer_count(), "Viewer connected");

    (
        [
            (header::CONTENT_TYPE, mjpeg::CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache, no-store"),
        ],
        Body::from_stream(viewer_stream(rx)),
    )
        .into_response()
}

/// Logs the disconnect when the response body is dropped
struct ViewerGuard;

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        tracing::info!("Viewer disconnected");
    }
}

/// Forward broadcast parts until the channel closes
///
/// A viewer that falls behind skips to the newest parts instead of stalling
/// the producer.
fn viewer_stream(rx: broadcast::Receiver<Bytes>) -> impl Stream<Item = Result<Bytes, Infallible>> {
    futures_util::stream::unfold((rx, ViewerGuard), |(mut rx, guard)| async move {
        loop {
            match rx.recv().await {
                Ok(part) => return Some((Ok(part), (rx, guard))),
                Err(RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "Viewer lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

//! HTTP front end for the readaloud extraction pipeline.
//!
//! One page in, one `{ title, textContent }` out:
//!
//! ```text
//! GET /api/fetch-url?url=<percent-encoded URL>
//! ```
//!
//! Failures never leak details to the client. A missing `url` is a 400;
//! anything that goes wrong after that is a 500 with a fixed body, and the
//! real cause is logged with its error kind.

mod config;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use readaloud_core::{DomBuilder, Fetcher, HtmlDomBuilder, Pipeline};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use routes::ApiError;

/// Shared, read-only state handed to every request.
pub struct AppState<F, B = HtmlDomBuilder> {
    pipeline: Arc<Pipeline<F, B>>,
    request_timeout: Duration,
}

impl<F, B> AppState<F, B> {
    pub fn new(pipeline: Pipeline<F, B>, request_timeout: Duration) -> Self {
        Self { pipeline: Arc::new(pipeline), request_timeout }
    }

    pub fn pipeline(&self) -> &Pipeline<F, B> {
        &self.pipeline
    }
}

impl<F, B> Clone for AppState<F, B> {
    fn clone(&self) -> Self {
        Self { pipeline: Arc::clone(&self.pipeline), request_timeout: self.request_timeout }
    }
}

/// Builds the application router.
pub fn router<F, B>(state: AppState<F, B>) -> Router
where
    F: Fetcher + 'static,
    B: DomBuilder + 'static,
{
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/api/fetch-url", get(routes::fetch_url::<F, B>))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

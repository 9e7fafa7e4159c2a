use std::sync::Arc;

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use readaloud_core::{DomBuilder, Extraction, ExtractionRequest, Fetcher, ReadaloudError};
use serde_json::json;
use tokio::task::JoinError;
use url::form_urlencoded;

use crate::AppState;

/// Client-facing failures of `/api/fetch-url`.
#[derive(Debug)]
pub enum ApiError {
    MissingUrl,
    Extraction(ReadaloudError),
    /// The blocking extraction task panicked or was cancelled.
    Worker(JoinError),
}

impl From<ReadaloudError> for ApiError {
    fn from(err: ReadaloudError) -> Self {
        ApiError::Extraction(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        ApiError::Worker(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingUrl => (StatusCode::BAD_REQUEST, "URL required"),
            ApiError::Extraction(err) => {
                tracing::error!(kind = %err.kind(), error = %err, "extraction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract blog")
            }
            ApiError::Worker(err) => {
                tracing::error!(error = %err, "extraction task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract blog")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// First non-empty `url` parameter of a raw query string. Repeats and
/// unknown parameters are ignored.
fn url_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, value)| key == "url" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

pub(crate) async fn fetch_url<F, B>(
    State(state): State<AppState<F, B>>, RawQuery(query): RawQuery,
) -> Result<Json<Extraction>, ApiError>
where
    F: Fetcher + 'static,
    B: DomBuilder + 'static,
{
    let url = url_param(query.as_deref()).ok_or(ApiError::MissingUrl)?;

    let request = ExtractionRequest::new(&url)?;
    let raw = state.pipeline.fetcher().fetch(request.url()).await?;

    // Tree building and scoring are CPU bound; keep them off the async workers.
    let pipeline = Arc::clone(&state.pipeline);
    let extraction = tokio::task::spawn_blocking(move || pipeline.process(&raw)).await??;

    tracing::info!(%url, chars = extraction.text_content.char_count(), "article extracted");
    Ok(Json(extraction))
}

pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_param() {
        assert_eq!(url_param(Some("url=https%3A%2F%2Fexample.com%2Fa")).as_deref(), Some("https://example.com/a"));
        assert_eq!(url_param(Some("x=1&url=https://example.com/b")).as_deref(), Some("https://example.com/b"));
        assert_eq!(url_param(Some("url=https://example.com/a&url=https://example.com/b")).as_deref(), Some("https://example.com/a"));
        assert_eq!(url_param(Some("url=&url=https://example.com/c")).as_deref(), Some("https://example.com/c"));
    }

    #[test]
    fn test_url_param_missing() {
        assert_eq!(url_param(None), None);
        assert_eq!(url_param(Some("")), None);
        assert_eq!(url_param(Some("url=")), None);
        assert_eq!(url_param(Some("link=https://example.com/")), None);
    }
}

// src/error.rs
//! Error taxonomy for the news pipeline.
//!
//! Only `CategoryNotFound` ever reaches a caller as an error. Source failures
//! are recovered inside the fetcher and logged; they exist here so the logs
//! and metrics speak the same vocabulary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NewsError {
    /// Requested category id is neither `all` nor part of the taxonomy.
    #[error("category not found: `{0}`")]
    CategoryNotFound(String),

    /// One source failed (network, status, malformed payload).
    #[error("source `{source_id}` failed: {reason}")]
    SourceFetch { source_id: String, reason: String },

    /// One source did not answer within its time budget.
    #[error("source `{source_id}` timed out after {timeout_ms} ms")]
    SourceTimeout { source_id: String, timeout_ms: u64 },

    /// Every configured source failed; callers get an empty list.
    #[error("all {0} news sources failed")]
    AllSourcesFailed(usize),
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        match self {
            NewsError::CategoryNotFound(category) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": "category_not_found",
                    "category": category,
                })),
            )
                .into_response(),
            other => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": "upstream",
                    "detail": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

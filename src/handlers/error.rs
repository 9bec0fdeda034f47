//! JSON error responses.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::content::GenerationError;
use crate::db::DbLockError;
use crate::llm::CompletionError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  /// Failure with a client-facing message and optional extra fields
  #[error("{message}")]
  Internal { message: String, details: Option<Value> },

  /// Completion service unavailable or misbehaving
  #[error("{0}")]
  Upstream(String),
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::NotFound(message.into())
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal {
      message: message.into(),
      details: None,
    }
  }

  pub fn internal_with(message: impl Into<String>, details: Value) -> Self {
    Self::Internal {
      message: message.into(),
      details: Some(details),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      Self::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let mut body = json!({ "error": self.to_string() });

    if let Self::Internal {
      details: Some(details),
      ..
    } = self
    {
      // Object details are merged into the body, anything else goes under "details"
      match details {
        Value::Object(fields) => {
          if let Value::Object(map) = &mut body {
            map.extend(fields);
          }
        }
        other => body["details"] = other,
      }
    }

    (status, Json(body)).into_response()
  }
}

impl From<rusqlite::Error> for ApiError {
  fn from(e: rusqlite::Error) -> Self {
    tracing::error!("Database error: {}", e);
    Self::internal_with("Database error", Value::String(e.to_string()))
  }
}

impl From<DbLockError> for ApiError {
  fn from(e: DbLockError) -> Self {
    Self::internal(e.to_string())
  }
}

impl From<CompletionError> for ApiError {
  fn from(e: CompletionError) -> Self {
    tracing::error!("Completion service error: {}", e);
    Self::internal_with("Completion service error", Value::String(e.to_string()))
  }
}

impl From<GenerationError> for ApiError {
  fn from(e: GenerationError) -> Self {
    tracing::error!("Question generation failed: {}", e);
    let message = e.to_string();
    match e {
      GenerationError::InvalidJson { raw, .. } => {
        Self::internal_with(message, json!({ "raw": raw }))
      }
      GenerationError::MissingQuestions { raw } => {
        Self::internal_with(message, json!({ "raw": raw }))
      }
    }
  }
}

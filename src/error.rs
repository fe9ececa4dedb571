//! Error taxonomy shared by stores, generators and handlers.
//!
//! Every variant maps to an HTTP status so handlers can return
//! `Result<_, AppError>` directly.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::db::DbLockError;

#[derive(Error, Debug)]
pub enum AppError {
  /// Bad or missing input, surfaced to the caller
  #[error("{0}")]
  Validation(String),

  /// Deck or card id did not resolve
  #[error("{0}")]
  NotFound(String),

  /// Session action issued in a state that does not accept it
  #[error("{0}")]
  InvalidState(String),

  /// Store or remote service call failed
  #[error("I/O error: {0}")]
  TransientIo(String),

  /// Remote generator answered with something that is not the expected JSON
  #[error("Malformed response: {0}")]
  MalformedResponse(String),

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("Database unavailable")]
  DbLock,
}

impl AppError {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::NotFound(msg.into())
  }

  pub fn invalid_state(msg: impl Into<String>) -> Self {
    Self::InvalidState(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::InvalidState(_) => StatusCode::CONFLICT,
      Self::TransientIo(_) | Self::MalformedResponse(_) | Self::Database(_) | Self::DbLock => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl From<DbLockError> for AppError {
  fn from(_: DbLockError) -> Self {
    Self::DbLock
  }
}

impl From<reqwest::Error> for AppError {
  fn from(e: reqwest::Error) -> Self {
    Self::TransientIo(e.to_string())
  }
}

impl From<serde_json::Error> for AppError {
  fn from(e: serde_json::Error) -> Self {
    Self::MalformedResponse(e.to_string())
  }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
  fn from(e: axum::extract::multipart::MultipartError) -> Self {
    Self::Validation(format!("Invalid upload: {}", e.body_text()))
  }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
  fn from(e: axum::extract::rejection::JsonRejection) -> Self {
    Self::Validation(format!("Invalid request body: {}", e.body_text()))
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("{}", self);
    }
    (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
  }
}

pub type Result<T> = std::result::Result<T, AppError>;

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// A referenced user, track, artist or album does not exist
  #[error("{0}")]
  NotFound(String),

  /// Malformed input, rejected before touching the database
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Database error: {0}")]
  Persistence(#[from] sqlx::Error),

  #[error("Password hashing error: {0}")]
  Hashing(#[from] bcrypt::BcryptError),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl AppError {
  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::NotFound(msg.into())
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Persistence(e) => persistence_status(e),
      Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

fn persistence_status(err: &sqlx::Error) -> StatusCode {
  match err {
    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
      StatusCode::SERVICE_UNAVAILABLE
    }
    sqlx::Error::Database(db) if db.is_unique_violation() => StatusCode::CONFLICT,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl From<JsonRejection> for AppError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl From<QueryRejection> for AppError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl From<PathRejection> for AppError {
  fn from(rejection: PathRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("Request failed: {}", self);
    }

    (status, Json(ErrorResponse { error: self.to_string() })).into_response()
  }
}

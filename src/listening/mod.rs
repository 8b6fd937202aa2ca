//! Listening history: recording plays and the queries derived from play counts.
//!
//! Every operation validates its arguments before touching the database and
//! returns [`AppError`](crate::error::AppError) classified for the HTTP layer.

pub mod history;
pub mod recorder;
pub mod suggestions;
pub mod trending;

pub use history::get_listening_history;
pub use recorder::record_listen;
pub use suggestions::suggest_tracks;
pub use trending::{get_most_listened, get_trending};

use crate::error::{AppError, AppResult};

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
/// Upper bound applied to every caller-supplied limit
pub const MAX_LIMIT: i64 = 100;

pub(crate) fn validate_limit(limit: i64) -> AppResult<i64> {
  if limit < 0 {
    return Err(AppError::validation("limit must not be negative"));
  }
  Ok(limit.min(MAX_LIMIT))
}

pub(crate) fn validate_window_days(days: i64) -> AppResult<i64> {
  if days < 0 {
    return Err(AppError::validation("days must not be negative"));
  }
  Ok(days)
}

use rand::seq::SliceRandom;

use super::validate_limit;
use crate::{
  db::{models::Track, users, DbPool},
  error::{AppError, AppResult},
};

/// Up to `limit` active tracks the user has never played, drawn uniformly at
/// random without replacement. Returns every candidate when there are fewer.
pub async fn suggest_tracks(pool: &DbPool, user_id: i64, limit: i64) -> AppResult<Vec<Track>> {
  let limit = validate_limit(limit)?;

  users::find_active_user(pool, user_id)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

  let mut candidates = sqlx::query_as::<_, Track>(
    r#"
    SELECT id, name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at
    FROM tracks
    WHERE is_active = 1
      AND id NOT IN (SELECT track_id FROM user_tracks WHERE user_id = ?)
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  tracing::debug!(
    "User {} has {} unlistened tracks, sampling {}",
    user_id,
    candidates.len(),
    limit
  );

  candidates.shuffle(&mut rand::thread_rng());
  candidates.truncate(limit as usize);

  Ok(candidates)
}

use chrono::{DateTime, Utc};

use crate::{
  db::{models::ListenRecord, users, DbPool},
  error::{AppError, AppResult},
};

/// Record that `user_id` played `track_id` at `now`.
///
/// The first play creates the `user_tracks` row with a count of one; later plays
/// bump the count and move `last_listened` forward. Both cases are one
/// `INSERT .. ON CONFLICT DO UPDATE`, so concurrent plays of the same pair can
/// neither duplicate the row nor lose an increment. The insert only selects
/// active users and tracks; when it yields nothing the lookups below decide
/// which side is missing.
pub async fn record_listen(
  pool: &DbPool,
  user_id: i64,
  track_id: i64,
  now: DateTime<Utc>,
) -> AppResult<ListenRecord> {
  let ts = now.timestamp();
  let mut tx = pool.begin().await?;

  let record = sqlx::query_as::<_, ListenRecord>(
    r#"
    INSERT INTO user_tracks (user_id, track_id, listen_count, last_listened, is_active, created_at, updated_at)
    SELECT u.id, t.id, 1, ?, 1, ?, ?
    FROM users u, tracks t
    WHERE u.id = ? AND u.is_active = 1 AND t.id = ? AND t.is_active = 1
    ON CONFLICT (user_id, track_id) DO UPDATE SET
        listen_count = user_tracks.listen_count + 1,
        last_listened = MAX(user_tracks.last_listened, excluded.last_listened),
        updated_at = excluded.updated_at
    RETURNING id, user_id, track_id, listen_count, last_listened, is_active, created_at, updated_at
    "#,
  )
  .bind(ts)
  .bind(ts)
  .bind(ts)
  .bind(user_id)
  .bind(track_id)
  .fetch_optional(&mut *tx)
  .await?;

  let Some(record) = record else {
    let missing = if users::find_active_user(&mut *tx, user_id).await?.is_none() {
      "User not found"
    } else {
      "Track not found"
    };
    return Err(AppError::not_found(missing));
  };

  tx.commit().await?;

  tracing::info!(
    "User {} listened to track {} (count: {})",
    user_id,
    track_id,
    record.listen_count
  );

  Ok(record)
}

use crate::{
  db::{models::HistoryEntry, users, DbPool},
  error::{AppError, AppResult},
};

/// One entry per track the user has played, most recent first.
///
/// Only the first associated artist is reported. A track without artists or
/// without an album yields `None` for that field.
pub async fn get_listening_history(pool: &DbPool, user_id: i64) -> AppResult<Vec<HistoryEntry>> {
  users::find_active_user(pool, user_id)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

  let entries = sqlx::query_as::<_, HistoryEntry>(
    r#"
    SELECT ut.track_id, ut.listen_count, ut.last_listened,
           t.name AS track_name,
           (
             SELECT a.name
             FROM track_artist ta
             JOIN artists a ON a.id = ta.artist_id
             WHERE ta.track_id = t.id
             ORDER BY ta.position, a.id
             LIMIT 1
           ) AS artist_name,
           al.name AS album_name
    FROM user_tracks ut
    JOIN tracks t ON t.id = ut.track_id
    LEFT JOIN albums al ON al.id = t.album_id
    WHERE ut.user_id = ?
    ORDER BY ut.last_listened DESC, ut.track_id ASC
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  Ok(entries)
}

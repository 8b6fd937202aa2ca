use chrono::{DateTime, Utc};

use super::{validate_limit, validate_window_days};
use crate::{
  db::{models::TrackListens, DbPool},
  error::AppResult,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Tracks ranked by the listens summed over records touched in the last
/// `window_days` days. Ties go to the lower track id.
pub async fn get_trending(
  pool: &DbPool,
  window_days: i64,
  limit: i64,
  now: DateTime<Utc>,
) -> AppResult<Vec<TrackListens>> {
  let window_days = validate_window_days(window_days)?;
  let limit = validate_limit(limit)?;

  let cutoff = now
    .timestamp()
    .saturating_sub(window_days.saturating_mul(SECONDS_PER_DAY));

  tracing::debug!("Trending tracks since {} (limit {})", cutoff, limit);
  ranked_tracks(pool, Some(cutoff), limit).await
}

/// All-time ranking, same ordering rules as [`get_trending`]
pub async fn get_most_listened(pool: &DbPool, limit: i64) -> AppResult<Vec<TrackListens>> {
  let limit = validate_limit(limit)?;
  ranked_tracks(pool, None, limit).await
}

async fn ranked_tracks(
  pool: &DbPool,
  since: Option<i64>,
  limit: i64,
) -> AppResult<Vec<TrackListens>> {
  let tracks = sqlx::query_as::<_, TrackListens>(
    r#"
    SELECT t.id, t.name, t.duration, t.file_path, t.thumbnail_path, t.album_id,
           t.is_active, t.created_at, t.updated_at,
           SUM(ut.listen_count) AS total_listens
    FROM tracks t
    JOIN user_tracks ut ON ut.track_id = t.id
    WHERE t.is_active = 1
      AND (?1 IS NULL OR ut.last_listened >= ?1)
    GROUP BY t.id
    HAVING SUM(ut.listen_count) > 0
    ORDER BY total_listens DESC, t.id ASC
    LIMIT ?2
    "#,
  )
  .bind(since)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok(tracks)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    db::{fixtures, test_pool},
    error::AppError,
    listening::record_listen,
  };

  const NOW: i64 = 1_700_000_000;

  fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
  }

  async fn listen_times(pool: &DbPool, user: i64, track: i64, times: usize, when: i64) {
    for _ in 0..times {
      record_listen(pool, user, track, at(when)).await.unwrap();
    }
  }

  fn ranking(tracks: &[TrackListens]) -> Vec<(i64, i64)> {
    tracks.iter().map(|t| (t.track.id, t.total_listens)).collect()
  }

  #[tokio::test]
  async fn ranks_by_summed_listens_across_users() {
    let pool = test_pool().await;
    let u1 = fixtures::user(&pool, "u1").await;
    let u2 = fixtures::user(&pool, "u2").await;
    let t1 = fixtures::track(&pool, "t1").await;
    let t2 = fixtures::track(&pool, "t2").await;

    listen_times(&pool, u1, t1, 3, NOW).await;
    listen_times(&pool, u1, t2, 1, NOW).await;
    listen_times(&pool, u2, t2, 4, NOW).await;

    let trending = get_trending(&pool, 7, 10, at(NOW)).await.unwrap();
    assert_eq!(ranking(&trending), vec![(t2, 5), (t1, 3)]);
  }

  #[tokio::test]
  async fn ties_are_broken_by_track_id() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    let a = fixtures::track(&pool, "a").await;
    let b = fixtures::track(&pool, "b").await;
    let c = fixtures::track(&pool, "c").await;

    for track in [c, a, b] {
      listen_times(&pool, user, track, 2, NOW).await;
    }

    let first = get_trending(&pool, 7, 10, at(NOW)).await.unwrap();
    let second = get_trending(&pool, 7, 10, at(NOW)).await.unwrap();
    assert_eq!(ranking(&first), vec![(a, 2), (b, 2), (c, 2)]);
    assert_eq!(ranking(&first), ranking(&second));
  }

  #[tokio::test]
  async fn records_outside_the_window_are_ignored() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    let recent = fixtures::track(&pool, "recent").await;
    let stale = fixtures::track(&pool, "stale").await;

    listen_times(&pool, user, recent, 1, NOW - 86_400).await;
    listen_times(&pool, user, stale, 9, NOW - 8 * 86_400).await;

    let trending = get_trending(&pool, 7, 10, at(NOW)).await.unwrap();
    assert_eq!(ranking(&trending), vec![(recent, 1)]);

    let all_time = get_most_listened(&pool, 10).await.unwrap();
    assert_eq!(ranking(&all_time), vec![(stale, 9), (recent, 1)]);
  }

  #[tokio::test]
  async fn limit_bounds_the_result() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    for i in 0..12 {
      let track = fixtures::track(&pool, &format!("t{i}")).await;
      listen_times(&pool, user, track, 1, NOW).await;
    }

    assert_eq!(get_trending(&pool, 7, 10, at(NOW)).await.unwrap().len(), 10);
    assert!(get_trending(&pool, 7, 0, at(NOW)).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn zero_day_window_only_counts_listens_at_now() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    let earlier = fixtures::track(&pool, "earlier").await;
    let current = fixtures::track(&pool, "current").await;

    listen_times(&pool, user, earlier, 1, NOW - 1).await;
    listen_times(&pool, user, current, 1, NOW).await;

    let trending = get_trending(&pool, 0, 10, at(NOW)).await.unwrap();
    assert_eq!(ranking(&trending), vec![(current, 1)]);
  }

  #[tokio::test]
  async fn tracks_without_listens_never_appear() {
    let pool = test_pool().await;
    fixtures::track(&pool, "silent").await;

    assert!(get_trending(&pool, 7, 10, at(NOW)).await.unwrap().is_empty());
    assert!(get_most_listened(&pool, 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn inactive_tracks_are_excluded() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    let hidden = fixtures::track(&pool, "hidden").await;
    listen_times(&pool, user, hidden, 3, NOW).await;

    sqlx::query("UPDATE tracks SET is_active = 0 WHERE id = ?")
      .bind(hidden)
      .execute(&pool)
      .await
      .unwrap();

    assert!(get_trending(&pool, 7, 10, at(NOW)).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn negative_arguments_are_rejected() {
    let pool = test_pool().await;

    let err = get_trending(&pool, -1, 10, at(NOW)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = get_trending(&pool, 7, -1, at(NOW)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = get_most_listened(&pool, -5).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }
}

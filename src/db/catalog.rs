use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use super::models::{Album, Artist, Track, TrackArtist};

#[derive(Debug, Clone)]
pub struct NewTrack {
  pub name: String,
  pub duration: i64,
  pub file_path: String,
  pub thumbnail_path: Option<String>,
  pub album_id: Option<i64>,
}

/// Partial track update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct TrackChanges {
  pub name: Option<String>,
  pub duration: Option<i64>,
  pub file_path: Option<String>,
  pub thumbnail_path: Option<String>,
  pub album_id: Option<i64>,
}

// Tracks

pub async fn insert_track<'e, E>(executor: E, track: &NewTrack, now: i64) -> Result<Track, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Track>(
    r#"
    INSERT INTO tracks (name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, 1, ?, ?)
    RETURNING id, name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at
    "#,
  )
  .bind(&track.name)
  .bind(track.duration)
  .bind(&track.file_path)
  .bind(&track.thumbnail_path)
  .bind(track.album_id)
  .bind(now)
  .bind(now)
  .fetch_one(executor)
  .await
}

pub async fn find_track<'e, E>(executor: E, id: i64) -> Result<Option<Track>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Track>(
    r#"
    SELECT id, name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at
    FROM tracks
    WHERE id = ?
    "#,
  )
  .bind(id)
  .fetch_optional(executor)
  .await
}

pub async fn list_tracks<'e, E>(executor: E) -> Result<Vec<Track>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Track>(
    r#"
    SELECT id, name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at
    FROM tracks
    ORDER BY id
    "#,
  )
  .fetch_all(executor)
  .await
}

pub async fn list_tracks_by_artist<'e, E>(executor: E, artist_id: i64) -> Result<Vec<Track>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Track>(
    r#"
    SELECT t.id, t.name, t.duration, t.file_path, t.thumbnail_path, t.album_id,
           t.is_active, t.created_at, t.updated_at
    FROM tracks t
    JOIN track_artist ta ON ta.track_id = t.id
    WHERE ta.artist_id = ?
    ORDER BY t.id
    "#,
  )
  .bind(artist_id)
  .fetch_all(executor)
  .await
}

pub async fn update_track<'e, E>(
  executor: E,
  id: i64,
  changes: &TrackChanges,
  now: i64,
) -> Result<Option<Track>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Track>(
    r#"
    UPDATE tracks SET
        name = COALESCE(?, name),
        duration = COALESCE(?, duration),
        file_path = COALESCE(?, file_path),
        thumbnail_path = COALESCE(?, thumbnail_path),
        album_id = COALESCE(?, album_id),
        updated_at = ?
    WHERE id = ?
    RETURNING id, name, duration, file_path, thumbnail_path, album_id, is_active, created_at, updated_at
    "#,
  )
  .bind(&changes.name)
  .bind(changes.duration)
  .bind(&changes.file_path)
  .bind(&changes.thumbnail_path)
  .bind(changes.album_id)
  .bind(now)
  .bind(id)
  .fetch_optional(executor)
  .await
}

/// Hard delete. Listen records and artist links go with it (`ON DELETE CASCADE`).
pub async fn delete_track<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
    .bind(id)
    .execute(executor)
    .await?;

  Ok(result.rows_affected() > 0)
}

/// Replace a track's artist links, keeping the given order. Repeated ids keep their first position.
pub async fn set_track_artists(
  conn: &mut SqliteConnection,
  track_id: i64,
  artist_ids: &[i64],
) -> Result<(), sqlx::Error> {
  sqlx::query("DELETE FROM track_artist WHERE track_id = ?")
    .bind(track_id)
    .execute(&mut *conn)
    .await?;

  let mut seen = Vec::with_capacity(artist_ids.len());
  for artist_id in artist_ids {
    if seen.contains(artist_id) {
      continue;
    }

    sqlx::query("INSERT INTO track_artist (track_id, artist_id, position) VALUES (?, ?, ?)")
      .bind(track_id)
      .bind(*artist_id)
      .bind(seen.len() as i64)
      .execute(&mut *conn)
      .await?;

    seen.push(*artist_id);
  }

  Ok(())
}

/// Artists of the given tracks, grouped by track and in association order
pub async fn artists_for_tracks<'e, E>(executor: E, track_ids: &[i64]) -> Result<Vec<TrackArtist>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  if track_ids.is_empty() {
    return Ok(Vec::new());
  }

  let mut builder = QueryBuilder::<Sqlite>::new(
    r#"
    SELECT ta.track_id, a.id, a.name, a.is_active, a.created_at, a.updated_at
    FROM track_artist ta
    JOIN artists a ON a.id = ta.artist_id
    WHERE ta.track_id IN ("#,
  );
  let mut ids = builder.separated(", ");
  for id in track_ids {
    ids.push_bind(*id);
  }
  ids.push_unseparated(") ORDER BY ta.track_id, ta.position, a.id");

  builder.build_query_as::<TrackArtist>().fetch_all(executor).await
}

// Artists

pub async fn insert_artist<'e, E>(executor: E, name: &str, now: i64) -> Result<Artist, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Artist>(
    r#"
    INSERT INTO artists (name, is_active, created_at, updated_at)
    VALUES (?, 1, ?, ?)
    RETURNING id, name, is_active, created_at, updated_at
    "#,
  )
  .bind(name)
  .bind(now)
  .bind(now)
  .fetch_one(executor)
  .await
}

pub async fn find_artist<'e, E>(executor: E, id: i64) -> Result<Option<Artist>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Artist>("SELECT id, name, is_active, created_at, updated_at FROM artists WHERE id = ?")
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_artist_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Artist>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Artist>("SELECT id, name, is_active, created_at, updated_at FROM artists WHERE name = ?")
    .bind(name)
    .fetch_optional(executor)
    .await
}

pub async fn list_artists<'e, E>(executor: E) -> Result<Vec<Artist>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Artist>("SELECT id, name, is_active, created_at, updated_at FROM artists ORDER BY id")
    .fetch_all(executor)
    .await
}

/// Removes the artist and its track links; the tracks themselves stay
pub async fn delete_artist<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query("DELETE FROM artists WHERE id = ?")
    .bind(id)
    .execute(executor)
    .await?;

  Ok(result.rows_affected() > 0)
}

// Albums

pub async fn insert_album<'e, E>(
  executor: E,
  name: &str,
  release_year: Option<i64>,
  now: i64,
) -> Result<Album, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Album>(
    r#"
    INSERT INTO albums (name, release_year, is_active, created_at, updated_at)
    VALUES (?, ?, 1, ?, ?)
    RETURNING id, name, release_year, is_active, created_at, updated_at
    "#,
  )
  .bind(name)
  .bind(release_year)
  .bind(now)
  .bind(now)
  .fetch_one(executor)
  .await
}

pub async fn find_album<'e, E>(executor: E, id: i64) -> Result<Option<Album>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Album>(
    "SELECT id, name, release_year, is_active, created_at, updated_at FROM albums WHERE id = ?",
  )
  .bind(id)
  .fetch_optional(executor)
  .await
}

pub async fn list_albums<'e, E>(executor: E) -> Result<Vec<Album>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, Album>(
    "SELECT id, name, release_year, is_active, created_at, updated_at FROM albums ORDER BY id",
  )
  .fetch_all(executor)
  .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{fixtures, test_pool};

  #[tokio::test]
  async fn track_artists_keep_association_order() {
    let pool = test_pool().await;
    let track = fixtures::track(&pool, "intro").await;
    let first = fixtures::artist(&pool, "Zed").await;
    let second = fixtures::artist(&pool, "Amy").await;

    let mut conn = pool.acquire().await.unwrap();
    set_track_artists(&mut conn, track, &[second, first, second]).await.unwrap();
    drop(conn);

    let linked = artists_for_tracks(&pool, &[track]).await.unwrap();
    let names: Vec<_> = linked.iter().map(|l| l.artist.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Zed"]);
  }

  #[tokio::test]
  async fn update_track_only_touches_given_fields() {
    let pool = test_pool().await;
    let id = fixtures::track(&pool, "draft").await;

    let changes = TrackChanges {
      name: Some("final".to_string()),
      ..Default::default()
    };
    let updated = update_track(&pool, id, &changes, 99).await.unwrap().unwrap();

    assert_eq!(updated.name, "final");
    assert_eq!(updated.duration, 180);
    assert_eq!(updated.file_path, "/music/draft.mp3");
    assert_eq!(updated.updated_at, 99);
  }

  #[tokio::test]
  async fn update_unknown_track_returns_none() {
    let pool = test_pool().await;
    let updated = update_track(&pool, 404, &TrackChanges::default(), 0).await.unwrap();
    assert!(updated.is_none());
  }

  #[tokio::test]
  async fn deleting_an_artist_keeps_its_tracks() {
    let pool = test_pool().await;
    let track = fixtures::track(&pool, "solo").await;
    let artist = fixtures::artist(&pool, "Nina").await;

    let mut conn = pool.acquire().await.unwrap();
    set_track_artists(&mut conn, track, &[artist]).await.unwrap();
    drop(conn);

    assert!(delete_artist(&pool, artist).await.unwrap());
    assert!(find_track(&pool, track).await.unwrap().is_some());
    assert!(artists_for_tracks(&pool, &[track]).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn artist_names_are_unique() {
    let pool = test_pool().await;
    insert_artist(&pool, "Nina", 0).await.unwrap();
    assert!(insert_artist(&pool, "Nina", 0).await.is_err());
  }
}

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub phone_number: Option<String>,
  pub password_hash: String,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Artist {
  pub id: i64,
  pub name: String,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Album {
  pub id: i64,
  pub name: String,
  pub release_year: Option<i64>,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Track {
  pub id: i64,
  pub name: String,
  pub duration: i64,
  pub file_path: String,
  pub thumbnail_path: Option<String>,
  pub album_id: Option<i64>,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

/// A row of `user_tracks`: how often a user played a track and when they last did
#[derive(Debug, Clone, FromRow)]
pub struct ListenRecord {
  pub id: i64,
  pub user_id: i64,
  pub track_id: i64,
  pub listen_count: i64,
  pub last_listened: i64,
  pub is_active: bool,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TrackListens {
  #[sqlx(flatten)]
  pub track: Track,
  pub total_listens: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
  pub track_id: i64,
  pub listen_count: i64,
  pub last_listened: i64,
  pub track_name: String,
  pub artist_name: Option<String>,
  pub album_name: Option<String>,
}

/// Artist as linked to a track, in association order
#[derive(Debug, Clone, FromRow)]
pub struct TrackArtist {
  pub track_id: i64,
  #[sqlx(flatten)]
  pub artist: Artist,
}

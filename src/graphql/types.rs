use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::routes::to_datetime;

/// GraphQL DateTime scalar
pub type DateTimeScalar = DateTime<Utc>;

/// Track type
#[derive(Debug, Clone, SimpleObject)]
pub struct Track {
  pub id: i64,
  pub name: String,
  /// Length in seconds
  pub duration: i64,
  pub file_path: String,
  pub thumbnail_path: Option<String>,
  pub album_id: Option<i64>,
}

impl From<crate::db::models::Track> for Track {
  fn from(t: crate::db::models::Track) -> Self {
    Self {
      id: t.id,
      name: t.name,
      duration: t.duration,
      file_path: t.file_path,
      thumbnail_path: t.thumbnail_path,
      album_id: t.album_id,
    }
  }
}

/// Track with its summed listen count
#[derive(Debug, Clone, SimpleObject)]
pub struct RankedTrack {
  pub track: Track,
  pub total_listens: i64,
}

impl From<crate::db::models::TrackListens> for RankedTrack {
  fn from(r: crate::db::models::TrackListens) -> Self {
    Self {
      track: r.track.into(),
      total_listens: r.total_listens,
    }
  }
}

/// One listening history entry
#[derive(Debug, Clone, SimpleObject)]
pub struct HistoryEntry {
  pub track_id: i64,
  pub listen_count: i64,
  pub last_listened: DateTimeScalar,
  pub track_name: String,
  /// First associated artist, if any
  pub artist: Option<String>,
  pub album: Option<String>,
}

impl From<crate::db::models::HistoryEntry> for HistoryEntry {
  fn from(h: crate::db::models::HistoryEntry) -> Self {
    Self {
      track_id: h.track_id,
      listen_count: h.listen_count,
      last_listened: to_datetime(h.last_listened),
      track_name: h.track_name,
      artist: h.artist_name,
      album: h.album_name,
    }
  }
}

/// Listen record type
#[derive(Debug, Clone, SimpleObject)]
pub struct ListenRecord {
  pub id: i64,
  pub user_id: i64,
  pub track_id: i64,
  pub listen_count: i64,
  pub last_listened: DateTimeScalar,
  pub is_active: bool,
  /// First time the user played the track
  pub created_at: DateTimeScalar,
  pub updated_at: DateTimeScalar,
}

impl From<crate::db::models::ListenRecord> for ListenRecord {
  fn from(r: crate::db::models::ListenRecord) -> Self {
    Self {
      id: r.id,
      user_id: r.user_id,
      track_id: r.track_id,
      listen_count: r.listen_count,
      last_listened: to_datetime(r.last_listened),
      is_active: r.is_active,
      created_at: to_datetime(r.created_at),
      updated_at: to_datetime(r.updated_at),
    }
  }
}

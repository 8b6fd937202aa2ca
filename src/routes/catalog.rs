use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use super::{
    extract::{AppJson, AppPath},
    to_datetime,
};
use crate::{
    db::{
        catalog::{self, NewTrack, TrackChanges},
        models::{Album, Artist, Track},
        now_ts, DbPool,
    },
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct TrackCreateRequest {
    pub name: String,
    pub duration: i64,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub artists_id: Vec<i64>,
    pub album_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackUpdateRequest {
    pub name: Option<String>,
    pub duration: Option<i64>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub artists_id: Option<Vec<i64>>,
    pub album_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TrackDeleteRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumCreateRequest {
    pub name: String,
    pub release_year: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Artist> for ArtistResponse {
    fn from(a: Artist) -> Self {
        Self {
            id: a.id,
            name: a.name,
            created_at: to_datetime(a.created_at),
            updated_at: to_datetime(a.updated_at),
            is_active: a.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    pub id: i64,
    pub name: String,
    pub release_year: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Album> for AlbumResponse {
    fn from(a: Album) -> Self {
        Self {
            id: a.id,
            name: a.name,
            release_year: a.release_year,
            created_at: to_datetime(a.created_at),
            updated_at: to_datetime(a.updated_at),
            is_active: a.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: i64,
    pub name: String,
    pub duration: i64,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub album: Option<AlbumResponse>,
    pub artists: Vec<ArtistResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Attach album and artists (in association order) to each track
async fn with_relations(conn: &mut SqliteConnection, tracks: Vec<Track>) -> AppResult<Vec<TrackResponse>> {
    let ids: Vec<i64> = tracks.iter().map(|t| t.id).collect();

    let mut artists: HashMap<i64, Vec<ArtistResponse>> = HashMap::new();
    for linked in catalog::artists_for_tracks(&mut *conn, &ids).await? {
        artists.entry(linked.track_id).or_default().push(linked.artist.into());
    }

    let mut albums: HashMap<i64, Album> = HashMap::new();
    for album_id in tracks.iter().filter_map(|t| t.album_id) {
        if albums.contains_key(&album_id) {
            continue;
        }
        if let Some(album) = catalog::find_album(&mut *conn, album_id).await? {
            albums.insert(album_id, album);
        }
    }

    Ok(tracks
        .into_iter()
        .map(|t| TrackResponse {
            album: t
                .album_id
                .and_then(|id| albums.get(&id).cloned())
                .map(AlbumResponse::from),
            artists: artists.remove(&t.id).unwrap_or_default(),
            id: t.id,
            name: t.name,
            duration: t.duration,
            file_path: t.file_path,
            thumbnail_path: t.thumbnail_path,
            created_at: to_datetime(t.created_at),
            updated_at: to_datetime(t.updated_at),
            is_active: t.is_active,
        })
        .collect())
}

fn validate_track_fields(name: Option<&str>, duration: Option<i64>) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::validation("Track name must not be empty"));
    }
    if duration.is_some_and(|d| d < 0) {
        return Err(AppError::validation("Track duration must not be negative"));
    }
    Ok(())
}

async fn ensure_album_exists(conn: &mut SqliteConnection, album_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = album_id {
        if catalog::find_album(&mut *conn, id).await?.is_none() {
            return Err(AppError::not_found(format!("Album with ID {} not found", id)));
        }
    }
    Ok(())
}

async fn ensure_artists_exist(conn: &mut SqliteConnection, artist_ids: &[i64]) -> AppResult<()> {
    for id in artist_ids {
        if catalog::find_artist(&mut *conn, *id).await?.is_none() {
            return Err(AppError::not_found(format!("Artist with ID {} not found", id)));
        }
    }
    Ok(())
}

pub async fn list_tracks(State(pool): State<DbPool>) -> Result<Json<Vec<TrackResponse>>, AppError> {
    let mut conn = pool.acquire().await?;
    let tracks = catalog::list_tracks(&mut *conn).await?;

    Ok(Json(with_relations(&mut conn, tracks).await?))
}

/// Track, album check and artist links commit together or not at all
pub async fn create_track(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<TrackCreateRequest>,
) -> Result<(StatusCode, Json<TrackResponse>), AppError> {
    validate_track_fields(Some(&req.name), Some(req.duration))?;

    let mut tx = pool.begin().await?;

    ensure_album_exists(&mut tx, req.album_id).await?;
    ensure_artists_exist(&mut tx, &req.artists_id).await?;

    let new_track = NewTrack {
        name: req.name,
        duration: req.duration,
        file_path: req.file_path,
        thumbnail_path: req.thumbnail_path,
        album_id: req.album_id,
    };
    let track = catalog::insert_track(&mut *tx, &new_track, now_ts()).await?;
    catalog::set_track_artists(&mut tx, track.id, &req.artists_id).await?;

    let mut response = with_relations(&mut tx, vec![track]).await?;
    tx.commit().await?;

    let response = response.remove(0);
    tracing::info!("Created track {} ({})", response.id, response.name);

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_track(
    State(pool): State<DbPool>,
    AppPath(track_id): AppPath<i64>,
    AppJson(req): AppJson<TrackUpdateRequest>,
) -> Result<Json<TrackResponse>, AppError> {
    validate_track_fields(req.name.as_deref(), req.duration)?;

    let mut tx = pool.begin().await?;

    ensure_album_exists(&mut tx, req.album_id).await?;
    if let Some(artist_ids) = &req.artists_id {
        ensure_artists_exist(&mut tx, artist_ids).await?;
    }

    let changes = TrackChanges {
        name: req.name,
        duration: req.duration,
        file_path: req.file_path,
        thumbnail_path: req.thumbnail_path,
        album_id: req.album_id,
    };
    let track = catalog::update_track(&mut *tx, track_id, &changes, now_ts())
        .await?
        .ok_or_else(|| AppError::not_found("Track not found"))?;

    if let Some(artist_ids) = &req.artists_id {
        catalog::set_track_artists(&mut tx, track.id, artist_ids).await?;
    }

    let mut response = with_relations(&mut tx, vec![track]).await?;
    tx.commit().await?;

    Ok(Json(response.remove(0)))
}

pub async fn delete_track(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<TrackDeleteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let track = catalog::find_track(&pool, req.id)
        .await?
        .ok_or_else(|| AppError::not_found("Track not found"))?;

    catalog::delete_track(&pool, track.id).await?;
    tracing::info!("Deleted track {} ({})", track.id, track.name);

    Ok(Json(MessageResponse {
        message: format!("Track '{}' deleted successfully", track.name),
    }))
}

pub async fn list_artists(State(pool): State<DbPool>) -> Result<Json<Vec<ArtistResponse>>, AppError> {
    let artists = catalog::list_artists(&pool).await?;
    Ok(Json(artists.into_iter().map(ArtistResponse::from).collect()))
}

pub async fn create_artist(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<ArtistRequest>,
) -> Result<(StatusCode, Json<ArtistResponse>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Artist name must not be empty"));
    }

    if catalog::find_artist_by_name(&pool, name).await?.is_some() {
        return Err(AppError::Conflict(format!("Artist '{}' already exists", name)));
    }

    let artist = catalog::insert_artist(&pool, name, now_ts()).await?;
    Ok((StatusCode::CREATED, Json(artist.into())))
}

pub async fn delete_artist(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<ArtistRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let artist = catalog::find_artist_by_name(&pool, &req.name)
        .await?
        .ok_or_else(|| AppError::not_found("Artist not found"))?;

    catalog::delete_artist(&pool, artist.id).await?;

    Ok(Json(MessageResponse {
        message: format!("Artist '{}' deleted successfully", artist.name),
    }))
}

pub async fn artist_tracks(
    State(pool): State<DbPool>,
    AppPath(artist_id): AppPath<i64>,
) -> Result<Json<Vec<TrackResponse>>, AppError> {
    let mut conn = pool.acquire().await?;

    catalog::find_artist(&mut *conn, artist_id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist not found"))?;

    let tracks = catalog::list_tracks_by_artist(&mut *conn, artist_id).await?;
    Ok(Json(with_relations(&mut conn, tracks).await?))
}

pub async fn list_albums(State(pool): State<DbPool>) -> Result<Json<Vec<AlbumResponse>>, AppError> {
    let albums = catalog::list_albums(&pool).await?;
    Ok(Json(albums.into_iter().map(AlbumResponse::from).collect()))
}

pub async fn create_album(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<AlbumCreateRequest>,
) -> Result<(StatusCode, Json<AlbumResponse>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Album name must not be empty"));
    }

    let album = catalog::insert_album(&pool, req.name.trim(), Some(req.release_year), now_ts()).await?;
    Ok((StatusCode::CREATED, Json(album.into())))
}

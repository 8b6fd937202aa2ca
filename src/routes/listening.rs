use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    extract::{AppJson, AppPath, AppQuery},
    to_datetime,
};
use crate::{
    db::{
        models::{HistoryEntry, Track, TrackListens},
        DbPool,
    },
    error::AppError,
    listening::{self, DEFAULT_LIMIT, DEFAULT_WINDOW_DAYS},
};

#[derive(Debug, Deserialize)]
pub struct ListenRequest {
    pub user_id: i64,
    pub track_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ListenResponse {
    pub message: String,
    pub user_id: i64,
    pub track_id: i64,
    pub listen_count: i64,
    pub last_listened: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RankedTrack {
    pub id: i64,
    pub name: String,
    pub duration: i64,
    pub file_path: String,
    pub total_listens: i64,
}

impl From<TrackListens> for RankedTrack {
    fn from(ranked: TrackListens) -> Self {
        Self {
            id: ranked.track.id,
            name: ranked.track.name,
            duration: ranked.track.duration,
            file_path: ranked.track.file_path,
            total_listens: ranked.total_listens,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub trending_tracks: Vec<RankedTrack>,
}

#[derive(Debug, Serialize)]
pub struct MostListenedResponse {
    pub most_listened_tracks: Vec<RankedTrack>,
}

#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub id: i64,
    pub name: String,
    pub duration: i64,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub album_id: Option<i64>,
}

impl From<Track> for TrackSummary {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            name: track.name,
            duration: track.duration,
            file_path: track.file_path,
            thumbnail_path: track.thumbnail_path,
            album_id: track.album_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggested_tracks: Vec<TrackSummary>,
}

#[derive(Debug, Serialize)]
pub struct TrackDetails {
    pub name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub track_id: i64,
    pub listen_count: i64,
    pub last_listened: DateTime<Utc>,
    pub track_details: TrackDetails,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            track_id: entry.track_id,
            listen_count: entry.listen_count,
            last_listened: to_datetime(entry.last_listened),
            track_details: TrackDetails {
                name: entry.track_name,
                artist: entry.artist_name,
                album: entry.album_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryItem>,
}

pub async fn listen_to_track(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<ListenRequest>,
) -> Result<(StatusCode, Json<ListenResponse>), AppError> {
    let record = listening::record_listen(&pool, req.user_id, req.track_id, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ListenResponse {
            message: "Track listened successfully".to_string(),
            user_id: record.user_id,
            track_id: record.track_id,
            listen_count: record.listen_count,
            last_listened: to_datetime(record.last_listened),
        }),
    ))
}

pub async fn trending_tracks(
    State(pool): State<DbPool>,
    AppQuery(query): AppQuery<TrendingQuery>,
) -> Result<Json<TrendingResponse>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let tracks = listening::get_trending(&pool, days, limit, Utc::now()).await?;

    Ok(Json(TrendingResponse {
        trending_tracks: tracks.into_iter().map(RankedTrack::from).collect(),
    }))
}

pub async fn most_listened_tracks(
    State(pool): State<DbPool>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Json<MostListenedResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let tracks = listening::get_most_listened(&pool, limit).await?;

    Ok(Json(MostListenedResponse {
        most_listened_tracks: tracks.into_iter().map(RankedTrack::from).collect(),
    }))
}

pub async fn suggested_tracks(
    State(pool): State<DbPool>,
    AppPath(user_id): AppPath<i64>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let tracks = listening::suggest_tracks(&pool, user_id, limit).await?;

    Ok(Json(SuggestionsResponse {
        suggested_tracks: tracks.into_iter().map(TrackSummary::from).collect(),
    }))
}

pub async fn listening_history(
    State(pool): State<DbPool>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = listening::get_listening_history(&pool, user_id).await?;

    Ok(Json(HistoryResponse {
        history: entries.into_iter().map(HistoryItem::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        db::{fixtures, test_pool},
        routes::{router, test_support::send},
    };

    #[tokio::test]
    async fn listen_with_missing_user_is_404() {
        let pool = test_pool().await;
        let track = fixtures::track(&pool, "t").await;
        let app = router(pool);

        let (status, body) = send(&app, "POST", "/listen/", Some(json!({ "user_id": 5, "track_id": track }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn listen_with_missing_track_is_404() {
        let pool = test_pool().await;
        let user = fixtures::user(&pool, "ada").await;
        let app = router(pool);

        let (status, body) = send(&app, "POST", "/listen/", Some(json!({ "user_id": user, "track_id": 8 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Track not found");
    }

    #[tokio::test]
    async fn negative_trending_arguments_are_400() {
        let app = router(test_pool().await);

        let (status, _) = send(&app, "GET", "/trending-tracks/?days=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/trending-tracks/?limit=-3", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = router(test_pool().await);

        let (status, body) = send(&app, "GET", "/trending-tracks/?days=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "POST", "/listen/", Some(json!({ "user_id": "one" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "GET", "/users/abc/history/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn trending_defaults_to_an_empty_list() {
        let app = router(test_pool().await);

        let (status, body) = send(&app, "GET", "/trending-tracks/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "trending_tracks": [] }));
    }

    #[tokio::test]
    async fn most_listened_is_all_time() {
        let pool = test_pool().await;
        let user = fixtures::user(&pool, "ada").await;
        let track = fixtures::track(&pool, "old").await;
        let long_ago = chrono::DateTime::from_timestamp(0, 0).unwrap();
        crate::listening::record_listen(&pool, user, track, long_ago).await.unwrap();
        let app = router(pool);

        let (_, trending) = send(&app, "GET", "/trending-tracks/", None).await;
        assert_eq!(trending["trending_tracks"], json!([]));

        let (status, body) = send(&app, "GET", "/most-listened-tracks/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["most_listened_tracks"][0]["id"], track);
        assert_eq!(body["most_listened_tracks"][0]["total_listens"], 1);
    }

    #[tokio::test]
    async fn history_and_suggestions_for_unknown_user_are_404() {
        let app = router(test_pool().await);

        let (status, _) = send(&app, "GET", "/users/3/history/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/users/3/suggestions/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_history_is_ok() {
        let pool = test_pool().await;
        let user = fixtures::user(&pool, "ada").await;
        let app = router(pool);

        let (status, body) = send(&app, "GET", &format!("/users/{user}/history/"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "history": [] }));
    }
}

pub mod catalog;
pub mod extract;
pub mod listening;
pub mod users;

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::{db::DbPool, graphql};

pub fn router(pool: DbPool) -> Router {
    let schema = graphql::build_schema(pool.clone());

    Router::new()
        // Users
        .route("/sign-up/", post(users::signup))
        .route("/check_password/", post(users::check_password))
        .route("/users/", get(users::list_users))
        .route("/users/by-username/{username}", get(users::get_user_by_username))
        .route("/users/{id}", get(users::get_user).delete(users::deactivate_user))
        .route("/users/{id}/suggestions/", get(listening::suggested_tracks))
        .route("/users/{id}/history/", get(listening::listening_history))
        // Catalog
        .route("/tracks/", get(catalog::list_tracks))
        .route("/track/", post(catalog::create_track).delete(catalog::delete_track))
        .route("/track/{track_id}/", patch(catalog::update_track))
        .route("/artists/", get(catalog::list_artists))
        .route("/artist/", post(catalog::create_artist).delete(catalog::delete_artist))
        .route("/artist/{artist_id}/tracks/", get(catalog::artist_tracks))
        .route("/albums/", get(catalog::list_albums).post(catalog::create_album))
        // Listening
        .route("/listen/", post(listening::listen_to_track))
        .route("/trending-tracks/", get(listening::trending_tracks))
        .route("/most-listened-tracks/", get(listening::most_listened_tracks))
        // GraphQL
        .route("/graphql", post(graphql::graphql_handler))
        // Health check
        .route("/health", get(health_check))
        .layer(Extension(schema))
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

/// Requests running past `timeout` are answered with 503, the same status as pool exhaustion
pub fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::SERVICE_UNAVAILABLE, timeout)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Stored Unix seconds as a UTC timestamp
pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

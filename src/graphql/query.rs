use async_graphql::*;
use chrono::Utc;

use crate::{db::DbPool, listening};
use super::types::{HistoryEntry, RankedTrack, Track};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
  /// Tracks ranked by listens over the last `days` days
  async fn trending_tracks(
    &self,
    ctx: &Context<'_>,
    #[graphql(default = 7)] days: i64,
    #[graphql(default = 10)] limit: i64,
  ) -> Result<Vec<RankedTrack>> {
    let pool = ctx.data::<DbPool>()?;

    let tracks = listening::get_trending(pool, days, limit, Utc::now()).await?;

    Ok(tracks.into_iter().map(RankedTrack::from).collect())
  }

  /// All-time ranking
  async fn most_listened_tracks(
    &self,
    ctx: &Context<'_>,
    #[graphql(default = 10)] limit: i64,
  ) -> Result<Vec<RankedTrack>> {
    let pool = ctx.data::<DbPool>()?;

    let tracks = listening::get_most_listened(pool, limit).await?;

    Ok(tracks.into_iter().map(RankedTrack::from).collect())
  }

  /// Random tracks the user has not listened to yet
  async fn suggested_tracks(
    &self,
    ctx: &Context<'_>,
    user_id: i64,
    #[graphql(default = 10)] limit: i64,
  ) -> Result<Vec<Track>> {
    let pool = ctx.data::<DbPool>()?;

    let tracks = listening::suggest_tracks(pool, user_id, limit).await?;

    Ok(tracks.into_iter().map(Track::from).collect())
  }

  async fn listening_history(&self, ctx: &Context<'_>, user_id: i64) -> Result<Vec<HistoryEntry>> {
    let pool = ctx.data::<DbPool>()?;

    let entries = listening::get_listening_history(pool, user_id).await?;

    Ok(entries.into_iter().map(HistoryEntry::from).collect())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use crate::{
    db::{fixtures, test_pool},
    graphql::build_schema,
    listening::record_listen,
  };

  #[tokio::test]
  async fn trending_and_history_queries() {
    let pool = test_pool().await;
    let user = fixtures::user(&pool, "u1").await;
    let t1 = fixtures::track(&pool, "t1").await;
    let t2 = fixtures::track(&pool, "t2").await;
    for _ in 0..3 {
      record_listen(&pool, user, t1, Utc::now()).await.unwrap();
    }
    record_listen(&pool, user, t2, Utc::now()).await.unwrap();
    let schema = build_schema(pool);

    let query = format!(
      "{{ trendingTracks {{ totalListens track {{ id }} }} listeningHistory(userId: {user}) {{ trackId listenCount artist }} }}"
    );
    let res = schema.execute(query.as_str()).await;
    assert!(res.errors.is_empty(), "{:?}", res.errors);

    let data = res.data.into_json().unwrap();
    assert_eq!(data["trendingTracks"][0]["track"]["id"], t1);
    assert_eq!(data["trendingTracks"][0]["totalListens"], 3);
    assert_eq!(data["trendingTracks"][1]["track"]["id"], t2);
    assert_eq!(data["listeningHistory"].as_array().unwrap().len(), 2);
    assert!(data["listeningHistory"][0]["artist"].is_null());
  }

  #[tokio::test]
  async fn negative_limit_is_a_validation_error() {
    let schema = build_schema(test_pool().await);

    let res = schema.execute("{ mostListenedTracks(limit: -1) { totalListens } }").await;
    assert_eq!(res.errors.len(), 1);
    assert_eq!(res.errors[0].message, "limit must not be negative");
  }

  #[tokio::test]
  async fn suggestions_for_unknown_user_error() {
    let schema = build_schema(test_pool().await);

    let res = schema.execute("{ suggestedTracks(userId: 5) { id } }").await;
    assert_eq!(res.errors[0].message, "User not found");
  }
}

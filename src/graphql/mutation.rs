use async_graphql::*;
use chrono::Utc;

use crate::{db::DbPool, listening};
use super::types::ListenRecord;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
  /// Record that a user played a track
  async fn listen(&self, ctx: &Context<'_>, user_id: i64, track_id: i64) -> Result<ListenRecord> {
    let pool = ctx.data::<DbPool>()?;

    let record = listening::record_listen(pool, user_id, track_id, Utc::now()).await?;

    Ok(record.into())
  }
}

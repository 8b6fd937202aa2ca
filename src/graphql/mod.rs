pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Extension;

use crate::db::DbPool;
use mutation::MutationRoot;
use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(pool: DbPool) -> AppSchema {
  Schema::build(QueryRoot, MutationRoot, EmptySubscription)
    .data(pool)
    .finish()
}

pub async fn graphql_handler(
  Extension(schema): Extension<AppSchema>,
  req: GraphQLRequest,
) -> GraphQLResponse {
  schema.execute(req.into_inner()).await.into()
}

mod auth;
mod config;
mod db;
mod error;
mod graphql;
mod listening;
mod routes;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trek=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting trek server");
    tracing::info!("Database: {}", config.database_url);

    // Connect to database and run migrations
    let pool = db::create_pool(&config).await?;

    let app = routes::router(pool)
        .layer(routes::timeout_layer(config.request_timeout))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_address()).await?;
    tracing::info!("REST API: http://{}", config.bind_address());
    tracing::info!("GraphQL: http://{}/graphql", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}

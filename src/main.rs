use std::sync::Arc;

use chat_gateway::db::{create_pool, run_migrations};
use chat_gateway::fanout::RedisPublisher;
use chat_gateway::message::message_repository::PgMessageStore;
use chat_gateway::message::message_service::MessageService;
use chat_gateway::routes::create_router;
use chat_gateway::state::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    // Create database connection pool
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DATABASE_URL environment variable is not set",
        )
    })?;

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Pub/sub client for realtime fan-out
    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let publisher = Arc::new(RedisPublisher::new(redis_client));

    let store = Arc::new(PgMessageStore::new(db));
    let message_service = MessageService::new(store, publisher, config.delete_match);

    let state = AppState {
        config: config.clone(),
        message_service,
    };

    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

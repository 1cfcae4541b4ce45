use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use varaamo::config::Config;
use varaamo::db::RedisStore;
use varaamo::error::Error;
use varaamo::shutdown;
use varaamo::startup::{build_router, init_logging, AppState};
use varaamo::store::{BookingStore, MemoryStore};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_logging();

    let config = Config::load()?;
    info!("Starting booking server");

    // Connect to the document store, falling back to an in-memory store so
    // the service still answers (with empty data) when Redis is down
    let store: Arc<dyn BookingStore> = match RedisStore::new(&config.redis_url) {
        Ok(redis_store) => Arc::new(redis_store),
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            info!("Using in-memory store as fallback");
            Arc::new(MemoryStore::default())
        }
    };

    let app = build_router(AppState { store });

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|_| {
            Error::Config(format!(
                "Invalid bind address {}:{}",
                config.bind_address, config.port
            ))
        })?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::Io)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::Io)?;

    Ok(())
}

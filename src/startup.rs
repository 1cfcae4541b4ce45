use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{
    availability_handler, book_handler, branches_handler, health_handler, services_handler,
    staff_handler,
};
use crate::store::BookingStore;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    /// Database for branches, services, staff, bookings and blocked times
    pub store: Arc<dyn BookingStore>,
}

/// Initialize tracing with environment-based configuration
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/availability", post(availability_handler))
        .route("/api/book", post(book_handler))
        .route("/api/branches", get(branches_handler))
        .route("/api/services", get(services_handler))
        .route("/api/staff", get(staff_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

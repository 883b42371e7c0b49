//! HTTP server and routes.

mod handlers;
mod payload;
mod state;

pub use payload::{BookPayload, NumberInput};
pub use state::AppState;

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    let api_routes = Router::new()
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/books/{id}",
            put(handlers::update_book).delete(handlers::delete_book),
        )
        .route("/export", get(handlers::export_books));

    Router::new()
        .nest("/api", api_routes)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir.join("static")))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

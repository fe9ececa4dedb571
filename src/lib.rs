pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod filters;
pub mod generator;
pub mod handlers;
pub mod paths;
pub mod session;
pub mod srs;
pub mod state;
pub mod store;
pub mod upload;
pub mod validation;

#[cfg(test)]
pub mod testing;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Room for multipart framing around the largest accepted file
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::pages::index))
        .route("/generate", post(handlers::pages::generate))
        .route("/decks", get(handlers::pages::decks).post(handlers::pages::save_deck))
        .route("/decks/{id}/delete", post(handlers::pages::delete_deck))
        .route("/review/reveal", post(handlers::review::reveal))
        .route("/review/submit", post(handlers::review::submit))
        .route("/review/{deck_id}", get(handlers::review::start))
        // JSON API
        .route("/api/generate", post(handlers::api::generate))
        .route("/api/upload", post(handlers::api::upload_file))
        .route(
            "/api/deck",
            get(handlers::api::list_decks)
                .post(handlers::api::create_deck)
                .delete(handlers::api::delete_deck),
        )
        .route(
            "/api/review",
            get(handlers::api::list_reviews).post(handlers::api::append_review),
        )
        .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

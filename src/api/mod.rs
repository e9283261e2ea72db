pub mod auth;
mod bookings;
pub mod error;
mod extract;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.config.server.public_dir.clone();
    let uploads_dir = state.config.server.uploads_dir.clone();

    let api_routes = Router::new()
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Bookings
        .route("/bookings", get(bookings::list_bookings))
        .route("/approved-bookings", get(bookings::list_approved_bookings))
        .route("/book", post(bookings::create_booking))
        .route("/approve", post(bookings::approve_booking))
        .route("/reject", post(bookings::reject_booking));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .merge(pages::router(&public_dir))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        // Remaining paths are static assets (login.html, scripts, styles)
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

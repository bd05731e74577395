mod api;
mod identity;
mod pages;

#[cfg(test)]
mod testing;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use api::{attach_image, lookup_paper, review_json, set_mode, update_fields};
pub use identity::CurrentUser;
pub use pages::{cancel_form, create_form, index, show_form, submit_form, view_review};

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();
    Router::new()
        .route("/", get(index))
        .route("/forms", post(create_form))
        .route("/forms/:form_id", get(show_form))
        .route("/forms/:form_id/lookup", post(lookup_paper))
        .route("/forms/:form_id/fields", post(update_fields))
        .route("/forms/:form_id/mode", post(set_mode))
        .route("/forms/:form_id/image", post(attach_image))
        .route("/forms/:form_id/submit", post(submit_form))
        .route("/forms/:form_id/cancel", post(cancel_form))
        .route("/reviews/:review_id", get(view_review))
        .route("/api/reviews/:review_id", get(review_json))
        .nest_service("/images", ServeDir::new(&config.image_folder))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(config.max_image_bytes + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

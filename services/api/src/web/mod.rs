pub mod chat;
pub mod rest;
pub mod saved;
pub mod state;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use saved::CollectionKind;
use state::AppState;
use std::sync::Arc;

pub use rest::{
    chat_handler, clear_course_url_cache_handler, course_details_handler, course_url_handler,
    insights_handler,
};

fn collection_routes(kind: CollectionKind) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(saved::list_saved_handler)
                .post(saved::add_saved_handler)
                .delete(saved::clear_saved_handler),
        )
        .route("/toggle", post(saved::toggle_saved_handler))
        .route("/remove", post(saved::remove_saved_handler))
        .route("/status", post(saved::saved_status_handler))
        .layer(Extension(kind))
}

/// Builds the API routes. CORS, body limits and docs are layered on by the binary.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/course-details", post(course_details_handler))
        .route(
            "/api/course-url",
            post(course_url_handler).delete(clear_course_url_cache_handler),
        )
        .route("/api/insights", post(insights_handler))
        .route("/api/dashboard", post(saved::dashboard_handler))
        .route("/api/chat/sessions", post(chat::create_chat_session_handler))
        .route(
            "/api/chat/sessions/{id}",
            get(chat::get_chat_session_handler).delete(chat::delete_chat_session_handler),
        )
        .route(
            "/api/chat/sessions/{id}/messages",
            post(chat::post_chat_message_handler),
        )
        .route(
            "/api/chat/sessions/{id}/feedback",
            post(chat::post_chat_feedback_handler),
        )
        .nest("/api/saved-courses", collection_routes(CollectionKind::SavedCourses))
        .nest("/api/bookmarks", collection_routes(CollectionKind::Bookmarks))
        .with_state(app_state)
}

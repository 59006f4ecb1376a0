pub mod admin;
pub mod availability;
pub mod booking;
pub mod chat;
pub mod content;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/packages", get(content::get_packages))
        .route("/api/content/:key", get(content::get_content))
        .route(
            "/api/availability/:date",
            get(availability::get_day_availability),
        )
        .route("/api/booking", post(booking::create_session))
        .route(
            "/api/booking/:id",
            get(booking::get_session).delete(booking::abandon_session),
        )
        .route("/api/booking/:id/times", get(booking::available_times))
        .route("/api/booking/:id/actions", post(booking::apply_action))
        .route("/api/booking/:id/confirm", post(booking::confirm))
        .route("/api/chat", post(chat::ask))
        .route("/api/admin/content", get(admin::list_content))
        .route("/api/admin/content/:key", put(admin::save_content))
        .route("/api/admin/availability/:date", post(admin::ensure_day))
        .route(
            "/api/admin/availability/:date/:time/block",
            post(admin::toggle_block),
        )
        .route(
            "/api/admin/availability/:date/:time/booked",
            post(admin::set_booked),
        )
        .with_state(state)
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            put(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/reset", post(handlers::reset_history))
        .route("/api/history/:date", get(handlers::get_day))
        .route("/api/emojis", get(handlers::suggested_emojis))
        .with_state(state)
}

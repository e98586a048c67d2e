use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    create_walk, get_available_slots, get_today_walk, get_walk_sessions, get_walk_stats,
    get_weekly_walks, match_walk, update_walk_status,
};
use crate::app_state::AppState;

pub fn walk_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_walk_sessions).post(create_walk))
        .route("/match", post(match_walk))
        .route("/slots", get(get_available_slots))
        .route("/today", get(get_today_walk))
        .route("/weekly", get(get_weekly_walks))
        .route("/stats", get(get_walk_stats))
        .route("/{id}/status", patch(update_walk_status))
}

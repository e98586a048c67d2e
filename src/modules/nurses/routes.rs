use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{
    get_available_nurses, get_my_profile, update_my_availability, update_my_profile,
};
use crate::app_state::AppState;

pub fn nurse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_available_nurses))
        .route("/me", get(get_my_profile).put(update_my_profile))
        .route("/me/availability", put(update_my_availability))
}

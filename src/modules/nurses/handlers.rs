use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use time::Date;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{UpdateAvailabilityPayload, UpdateNurseProfile};
use crate::error::{AppError, AppResult};
use crate::extractors::AuthUser;
use crate::modules::nurses::service::{self, NurseSearchFilters};

#[derive(Debug, Deserialize)]
pub struct NurseSearchQuery {
    pub specialization: Option<String>,
    pub date: Option<Date>,
    pub time: Option<String>,
    pub duration: Option<i32>,
}

/// GET /api/v1/nurses
pub async fn get_available_nurses(
    State(state): State<AppState>,
    Query(query): Query<NurseSearchQuery>,
) -> AppResult<impl IntoResponse> {
    let nurses = service::get_available_nurses(
        &state.db,
        &NurseSearchFilters {
            specialization: query.specialization,
            date: query.date,
            time: query.time,
            duration: query.duration,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": nurses })))
}

/// GET /api/v1/nurses/me
pub async fn get_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let profile = service::get_nurse_profile(&state.db, auth.user_id).await?;

    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PUT /api/v1/nurses/me
pub async fn update_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateNurseProfile>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service::update_nurse_profile(&state.db, auth.user_id, &payload).await?;

    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PUT /api/v1/nurses/me/availability
pub async fn update_my_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateAvailabilityPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    for slot in &payload.slots {
        slot.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let windows = service::update_nurse_availability(&state.db, auth.user_id, &payload).await?;

    Ok(Json(json!({ "success": true, "data": windows })))
}

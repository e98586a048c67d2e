use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{
    CreateWalksPayload, ElderlyProfile, MatchWalkPayload, UpdateWalkStatusPayload,
    WalkSessionStatus,
};
use crate::db::ElderlyRepository;
use crate::error::{AppError, AppResult};
use crate::extractors::AuthUser;
use crate::modules::walks::service::{self, StatsPeriod, WalkListFilters};

async fn elderly_profile_for(pool: &PgPool, user_id: Uuid) -> AppResult<ElderlyProfile> {
    ElderlyRepository::find_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Elderly profile not found for this user".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWalksQuery {
    pub status: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub limit: Option<i64>,
}

/// GET /api/v1/walks
pub async fn get_walk_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListWalksQuery>,
) -> AppResult<impl IntoResponse> {
    let profile = elderly_profile_for(&state.db, auth.user_id).await?;

    let status = match query.status.as_deref() {
        Some(label) => Some(WalkSessionStatus::from_client_label(label).ok_or_else(|| {
            AppError::Validation(format!("Unknown session status '{label}'"))
        })?),
        None => None,
    };

    let sessions = service::get_walk_sessions_by_elderly(
        &state.db,
        profile.id,
        WalkListFilters {
            status,
            start_date: query.start_date,
            end_date: query.end_date,
            limit: query.limit,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": sessions })))
}

/// POST /api/v1/walks
pub async fn create_walk(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateWalksPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = elderly_profile_for(&state.db, auth.user_id).await?;
    let outcome = service::create_walk_sessions(&state.db, &profile, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": outcome })),
    ))
}

/// POST /api/v1/walks/match
pub async fn match_walk(
    State(state): State<AppState>,
    Json(payload): Json<MatchWalkPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let nurse = service::match_nurse_summary(
        &state.db,
        payload.scheduled_date,
        &payload.scheduled_time,
        payload.duration,
    )
    .await?
    .ok_or_else(|| {
        AppError::NotFound("No nurses available for the selected time slot".to_string())
    })?;

    Ok(Json(json!({ "success": true, "data": nurse })))
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<Date>,
}

/// GET /api/v1/walks/slots
pub async fn get_available_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<impl IntoResponse> {
    let date = query
        .date
        .ok_or_else(|| AppError::Validation("Date is required".to_string()))?;

    let slots = service::get_available_time_slots(&state.db, date).await?;

    Ok(Json(json!({ "success": true, "data": slots })))
}

/// GET /api/v1/walks/today
pub async fn get_today_walk(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let profile = elderly_profile_for(&state.db, auth.user_id).await?;
    let session = service::get_today_walk_session(&state.db, profile.id).await?;

    Ok(Json(json!({ "success": true, "data": session })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyQuery {
    pub week_start: Option<Date>,
}

/// GET /api/v1/walks/weekly
pub async fn get_weekly_walks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<WeeklyQuery>,
) -> AppResult<impl IntoResponse> {
    let profile = elderly_profile_for(&state.db, auth.user_id).await?;
    let data =
        service::get_weekly_walk_sessions(&state.db, profile.id, query.week_start).await?;

    Ok(Json(json!({ "success": true, "data": data })))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}

/// GET /api/v1/walks/stats
pub async fn get_walk_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<impl IntoResponse> {
    let profile = elderly_profile_for(&state.db, auth.user_id).await?;

    let period = match query.period.as_deref() {
        Some(raw) => StatsPeriod::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Unknown stats period '{raw}'")))?,
        None => StatsPeriod::AllTime,
    };

    let stats = service::get_walk_statistics(&state.db, profile.id, period).await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}

/// PATCH /api/v1/walks/{id}/status
pub async fn update_walk_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateWalkStatusPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session =
        service::update_walk_status(&state.db, auth.user_id, session_id, &payload).await?;

    Ok(Json(json!({ "success": true, "data": session })))
}

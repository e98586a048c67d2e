use serde::Serialize;
use sqlx::PgPool;
use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{
    AvailabilitySlotPayload, NewAvailabilityWindow, NurseAvailability, NurseProfile,
    UpdateAvailabilityPayload, UpdateNurseProfile,
};
use crate::db::{DatabaseError, NurseRepository};
use crate::error::{AppError, AppResult};
use crate::modules::nurses::availability::{
    filter_available_nurses, format_date, format_time_of_day, parse_time_of_day,
};
use crate::modules::walks::service::{load_candidates, matching_score, parse_scheduled_time};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_picture: Option<String>,
    pub specializations: Vec<String>,
    pub rating: f64,
    pub experience_years: i32,
    pub total_walks: i32,
    pub matching_score: i32,
}

impl NurseSummary {
    fn from_profile(profile: &NurseProfile) -> Self {
        NurseSummary {
            id: profile.id,
            name: profile.name.clone(),
            profile_picture: profile.profile_picture.clone(),
            specializations: profile.specializations.clone(),
            rating: profile.rating,
            experience_years: profile.experience_years,
            total_walks: profile.total_walks,
            matching_score: matching_score(profile.rating),
        }
    }
}

#[derive(Debug, Default)]
pub struct NurseSearchFilters {
    pub specialization: Option<String>,
    pub date: Option<Date>,
    pub time: Option<String>,
    pub duration: Option<i32>,
}

const DEFAULT_SEARCH_DURATION_MINUTES: i32 = 60;

/// Nurses an elderly client could book. With a date and time the
/// evaluator refines the coarse repository filter; otherwise this is a
/// plain listing of nurses marked available.
pub async fn get_available_nurses(
    pool: &PgPool,
    filters: &NurseSearchFilters,
) -> AppResult<Vec<NurseSummary>> {
    info!(
        specialization = filters.specialization.as_deref(),
        date = ?filters.date,
        "fetching available nurses"
    );

    match (filters.date, filters.time.as_deref()) {
        (Some(date), Some(raw_time)) => {
            let start = parse_scheduled_time(raw_time)?;
            let duration = filters
                .duration
                .unwrap_or(DEFAULT_SEARCH_DURATION_MINUTES);
            let candidates =
                load_candidates(pool, date, filters.specialization.as_deref()).await?;
            let available = filter_available_nurses(candidates, date, start, duration);
            Ok(available
                .iter()
                .map(|c| NurseSummary::from_profile(&c.profile))
                .collect())
        }
        _ => {
            let nurses =
                NurseRepository::find_available_nurses(pool, filters.specialization.as_deref())
                    .await?;
            Ok(nurses.iter().map(NurseSummary::from_profile).collect())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindowView {
    pub id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring: bool,
    pub specific_date: Option<String>,
}

impl AvailabilityWindowView {
    fn from_window(window: &NurseAvailability) -> Self {
        AvailabilityWindowView {
            id: window.id,
            day_of_week: window.day_of_week,
            start_time: format_time_of_day(window.start_time),
            end_time: format_time_of_day(window.end_time),
            is_recurring: window.is_recurring,
            specific_date: window.specific_date.map(format_date),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseProfileView {
    #[serde(flatten)]
    pub summary: NurseSummary,
    pub phone: String,
    pub gender: String,
    pub max_patients_per_day: i32,
    pub address: String,
    pub availability: Vec<AvailabilityWindowView>,
}

pub async fn get_nurse_profile(pool: &PgPool, user_id: Uuid) -> AppResult<NurseProfileView> {
    let nurse = nurse_for_user(pool, user_id).await?;
    let windows = NurseRepository::find_availability_windows(pool, nurse.id).await?;

    Ok(NurseProfileView {
        summary: NurseSummary::from_profile(&nurse),
        phone: nurse.phone.clone(),
        gender: nurse.gender.clone(),
        max_patients_per_day: nurse.max_patients_per_day,
        address: nurse.address.clone(),
        availability: windows.iter().map(AvailabilityWindowView::from_window).collect(),
    })
}

pub async fn update_nurse_profile(
    pool: &PgPool,
    user_id: Uuid,
    data: &UpdateNurseProfile,
) -> AppResult<NurseProfileView> {
    let nurse = nurse_for_user(pool, user_id).await?;
    NurseRepository::update_profile(pool, nurse.id, data).await?;
    get_nurse_profile(pool, user_id).await
}

/// Replace the nurse's availability windows wholesale in one transaction.
pub async fn update_nurse_availability(
    pool: &PgPool,
    user_id: Uuid,
    payload: &UpdateAvailabilityPayload,
) -> AppResult<Vec<AvailabilityWindowView>> {
    let nurse = nurse_for_user(pool, user_id).await?;

    let windows = payload
        .slots
        .iter()
        .map(parse_slot)
        .collect::<AppResult<Vec<_>>>()?;

    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;
    NurseRepository::replace_availability(&mut tx, nurse.id, &windows).await?;
    tx.commit().await.map_err(DatabaseError::from)?;

    let stored = NurseRepository::find_availability_windows(pool, nurse.id).await?;
    Ok(stored.iter().map(AvailabilityWindowView::from_window).collect())
}

fn parse_slot(slot: &AvailabilitySlotPayload) -> AppResult<NewAvailabilityWindow> {
    let start_time = parse_time_of_day(&slot.start_time)
        .map_err(|_| AppError::Validation("Slot start time must be in HH:MM format".to_string()))?;
    let end_time = parse_time_of_day(&slot.end_time)
        .map_err(|_| AppError::Validation("Slot end time must be in HH:MM format".to_string()))?;
    if start_time >= end_time {
        return Err(AppError::Validation(
            "Slot start time must be before its end time".to_string(),
        ));
    }

    Ok(NewAvailabilityWindow {
        day_of_week: slot.day_of_week,
        start_time,
        end_time,
        is_recurring: slot.is_recurring.unwrap_or(true),
        specific_date: slot.specific_date,
    })
}

async fn nurse_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<NurseProfile> {
    NurseRepository::find_nurse_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Nurse profile not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> AvailabilitySlotPayload {
        AvailabilitySlotPayload {
            day_of_week: 1,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_recurring: None,
            specific_date: None,
        }
    }

    #[test]
    fn slot_parsing_defaults_to_recurring() {
        let parsed = parse_slot(&slot("08:00", "12:00")).unwrap();
        assert!(parsed.is_recurring);
        assert_eq!(parsed.day_of_week, 1);
    }

    #[test]
    fn slot_with_inverted_times_is_rejected() {
        assert!(parse_slot(&slot("12:00", "08:00")).is_err());
        assert!(parse_slot(&slot("08:00", "08:00")).is_err());
    }

    #[test]
    fn slot_with_malformed_time_is_rejected() {
        assert!(parse_slot(&slot("8am", "12:00")).is_err());
    }
}

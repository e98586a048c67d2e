use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::PgPool;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime, Time};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::{
    CreateWalksPayload, ElderlyProfile, MatchingMode, NewWalkSession, NurseAvailability,
    NurseProfile, UpdateWalkStatusPayload, WalkSession, WalkSessionStatus,
};
use crate::db::{DatabaseError, ElderlyRepository, NurseRepository, WalkRepository};
use crate::error::{AppError, AppResult};
use crate::modules::nurses::availability::{
    crosses_midnight, day_of_week_index, filter_available_nurses, format_date,
    format_time_of_day, is_nurse_available, parse_time_of_day, NurseCandidate,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkSessionSummary {
    pub id: Uuid,
    pub elderly_id: Uuid,
    pub nurse_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub duration: i32,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: String,
}

impl WalkSessionSummary {
    pub fn from_session(session: &WalkSession) -> Self {
        WalkSessionSummary {
            id: session.id,
            elderly_id: session.elderly_id,
            nurse_id: session.nurse_id,
            scheduled_date: format_date(session.scheduled_date),
            scheduled_time: format_time_of_day(session.scheduled_time),
            duration: session.duration_minutes,
            status: session.status.client_label(),
            cancellation_reason: session.cancellation_reason.clone(),
            created_at: session
                .created_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| session.created_at.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedNurse {
    pub id: Uuid,
    pub name: String,
    pub rating: f64,
    pub matching_score: i32,
}

impl MatchedNurse {
    fn from_profile(profile: &NurseProfile) -> Self {
        MatchedNurse {
            id: profile.id,
            name: profile.name.clone(),
            rating: profile.rating,
            matching_score: matching_score(profile.rating),
        }
    }
}

/// Five-star rating projected onto a 100-point scale for the clients.
pub fn matching_score(rating: f64) -> i32 {
    (rating * 20.0).round() as i32
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFailure {
    pub scheduled_date: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub created: Vec<WalkSessionSummary>,
    pub failed: Vec<DateFailure>,
}

enum DateMatchError {
    NoNurse(String),
    NurseUnavailable(String),
}

impl DateMatchError {
    fn message(&self) -> &str {
        match self {
            DateMatchError::NoNurse(msg) | DateMatchError::NurseUnavailable(msg) => msg,
        }
    }

    fn into_app_error(self) -> AppError {
        match self {
            DateMatchError::NoNurse(msg) => AppError::NotFound(msg),
            DateMatchError::NurseUnavailable(msg) => AppError::Validation(msg),
        }
    }
}

/// Book one session per requested date.
///
/// Matching runs per date and a date that cannot be matched fails alone;
/// the insert of every matched date then happens in a single transaction,
/// so an unexpected write failure (including the overlap constraint
/// firing under a concurrent booking) rolls the whole batch back.
pub async fn create_walk_sessions(
    pool: &PgPool,
    elderly: &ElderlyProfile,
    payload: &CreateWalksPayload,
) -> AppResult<BookingOutcome> {
    let start = parse_scheduled_time(&payload.scheduled_time)?;
    if crosses_midnight(start, payload.duration) {
        return Err(AppError::Validation(
            "Session may not extend past midnight".to_string(),
        ));
    }

    let manual_nurse = match payload.matching_mode {
        MatchingMode::Manual => {
            let nurse_id = payload.nurse_id.ok_or_else(|| {
                AppError::Validation("Nurse ID is required for manual matching mode".to_string())
            })?;
            let nurse = NurseRepository::find_nurse_by_id(pool, nurse_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Selected nurse not found".to_string()))?;
            Some(nurse)
        }
        MatchingMode::Auto => None,
    };

    info!(
        elderly_id = %elderly.id,
        dates = payload.scheduled_dates.len(),
        mode = ?payload.matching_mode,
        "creating walk sessions"
    );

    let mut matched: Vec<(Date, Uuid)> = Vec::new();
    let mut failures: Vec<(Date, DateMatchError)> = Vec::new();
    let mut seen_dates = HashSet::new();

    for &date in &payload.scheduled_dates {
        if !seen_dates.insert(date) {
            continue;
        }

        let resolved = match &manual_nurse {
            Some(nurse) => {
                let candidate = load_candidate(pool, nurse.clone(), date).await?;
                if is_nurse_available(&candidate, date, start, payload.duration) {
                    Ok(candidate.profile.id)
                } else {
                    Err(DateMatchError::NurseUnavailable(format!(
                        "Selected nurse is not available for the chosen time slot on {}",
                        format_date(date)
                    )))
                }
            }
            None => match find_matching_nurse(pool, date, start, payload.duration).await? {
                Some(candidate) => Ok(candidate.profile.id),
                None => Err(DateMatchError::NoNurse(format!(
                    "No nurses available for the selected time slot on {}",
                    format_date(date)
                ))),
            },
        };

        match resolved {
            Ok(nurse_id) => matched.push((date, nurse_id)),
            Err(err) => {
                warn!(date = %format_date(date), reason = err.message(), "walk date not matched");
                failures.push((date, err));
            }
        }
    }

    if matched.is_empty() {
        let first = failures
            .into_iter()
            .next()
            .map(|(_, err)| err.into_app_error())
            .unwrap_or_else(|| {
                AppError::Validation("At least one scheduled date is required".to_string())
            });
        return Err(first);
    }

    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;
    let mut created = Vec::with_capacity(matched.len());
    for (date, nurse_id) in matched {
        let session = WalkRepository::create_walk_session(
            &mut tx,
            &NewWalkSession {
                elderly_id: elderly.id,
                nurse_id,
                scheduled_date: date,
                scheduled_time: start,
                duration_minutes: payload.duration,
            },
        )
        .await?;
        created.push(WalkSessionSummary::from_session(&session));
    }
    tx.commit().await.map_err(DatabaseError::from)?;

    Ok(BookingOutcome {
        created,
        failed: failures
            .into_iter()
            .map(|(date, err)| DateFailure {
                scheduled_date: format_date(date),
                reason: err.message().to_string(),
            })
            .collect(),
    })
}

/// Auto-mode matching: coarse SQL candidate filter, fine filter through
/// the availability evaluator, then pick the highest-rated nurse.
pub async fn find_matching_nurse(
    pool: &PgPool,
    date: Date,
    start: Time,
    duration_minutes: i32,
) -> AppResult<Option<NurseCandidate>> {
    let candidates = load_candidates(pool, date, None).await?;
    let available = filter_available_nurses(candidates, date, start, duration_minutes);
    Ok(pick_first_highest_rated(available))
}

pub async fn match_nurse_summary(
    pool: &PgPool,
    date: Date,
    scheduled_time: &str,
    duration_minutes: i32,
) -> AppResult<Option<MatchedNurse>> {
    let start = parse_scheduled_time(scheduled_time)?;
    let matched = find_matching_nurse(pool, date, start, duration_minutes).await?;
    Ok(matched.map(|c| MatchedNurse::from_profile(&c.profile)))
}

/// Highest rating wins; ties keep the earliest candidate, so the
/// repository's ordering decides between equally rated nurses.
fn pick_first_highest_rated(mut candidates: Vec<NurseCandidate>) -> Option<NurseCandidate> {
    let mut best: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        best = match best {
            Some(current) if candidate.profile.rating <= candidates[current].profile.rating => {
                Some(current)
            }
            _ => Some(index),
        };
    }
    best.map(|index| candidates.swap_remove(index))
}

pub async fn load_candidates(
    pool: &PgPool,
    date: Date,
    specialization: Option<&str>,
) -> AppResult<Vec<NurseCandidate>> {
    let day_of_week = day_of_week_index(date);
    let profiles =
        NurseRepository::find_candidate_nurses(pool, day_of_week, date, specialization).await?;
    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    let nurse_ids: Vec<Uuid> = profiles.iter().map(|n| n.id).collect();
    let mut windows_by_nurse: HashMap<Uuid, Vec<NurseAvailability>> = HashMap::new();
    for window in NurseRepository::find_availability_windows_for_nurses(pool, &nurse_ids).await? {
        windows_by_nurse
            .entry(window.nurse_id)
            .or_default()
            .push(window);
    }

    let mut sessions_by_nurse: HashMap<Uuid, Vec<WalkSession>> = HashMap::new();
    for session in
        WalkRepository::find_blocking_sessions_for_nurses(pool, &nurse_ids, date).await?
    {
        sessions_by_nurse
            .entry(session.nurse_id)
            .or_default()
            .push(session);
    }

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let windows = windows_by_nurse.remove(&profile.id).unwrap_or_default();
            let booked = sessions_by_nurse.remove(&profile.id).unwrap_or_default();
            NurseCandidate {
                profile,
                windows,
                booked,
            }
        })
        .collect())
}

async fn load_candidate(
    pool: &PgPool,
    profile: NurseProfile,
    date: Date,
) -> AppResult<NurseCandidate> {
    let windows = NurseRepository::find_availability_windows(pool, profile.id).await?;
    let booked =
        WalkRepository::find_blocking_sessions_for_nurses(pool, &[profile.id], date).await?;
    Ok(NurseCandidate {
        profile,
        windows,
        booked,
    })
}

pub fn parse_scheduled_time(value: &str) -> AppResult<Time> {
    parse_time_of_day(value)
        .map_err(|_| AppError::Validation("Scheduled time must be in HH:MM format".to_string()))
}

#[derive(Debug, Serialize)]
pub struct TimeSlot {
    pub time: String,
    pub label: String,
    pub available: bool,
}

const SLOT_FIRST_HOUR: u8 = 8;
const SLOT_LAST_HOUR: u8 = 18;
const SLOT_PROBE_DURATION_MINUTES: i32 = 60;

/// Hourly candidate slots for a date, each probed against the evaluator
/// with the default session length.
pub async fn get_available_time_slots(pool: &PgPool, date: Date) -> AppResult<Vec<TimeSlot>> {
    let candidates = load_candidates(pool, date, None).await?;

    let slots = (SLOT_FIRST_HOUR..=SLOT_LAST_HOUR)
        .map(|hour| {
            let slot_time = Time::from_hms(hour, 0, 0).expect("hour is within 0-23");
            let available = candidates
                .iter()
                .any(|c| is_nurse_available(c, date, slot_time, SLOT_PROBE_DURATION_MINUTES));
            TimeSlot {
                time: format_time_of_day(slot_time),
                label: twelve_hour_label(hour),
                available,
            }
        })
        .collect();

    Ok(slots)
}

fn twelve_hour_label(hour: u8) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:00 {}", display, suffix)
}

#[derive(Debug, Default)]
pub struct WalkListFilters {
    pub status: Option<WalkSessionStatus>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub limit: Option<i64>,
}

pub async fn get_walk_sessions_by_elderly(
    pool: &PgPool,
    elderly_id: Uuid,
    filters: WalkListFilters,
) -> AppResult<Vec<WalkSessionSummary>> {
    let sessions = WalkRepository::find_walks_by_elderly(
        pool,
        elderly_id,
        filters.status,
        filters.start_date,
        filters.end_date,
        filters.limit,
    )
    .await?;

    Ok(sessions.iter().map(WalkSessionSummary::from_session).collect())
}

pub async fn get_today_walk_session(
    pool: &PgPool,
    elderly_id: Uuid,
) -> AppResult<Option<WalkSessionSummary>> {
    let today = OffsetDateTime::now_utc().date();
    let session = WalkRepository::find_today_walk(pool, elderly_id, today).await?;
    Ok(session.as_ref().map(WalkSessionSummary::from_session))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWalks {
    pub week_start: String,
    pub week_end: String,
    pub sessions: Vec<WalkSessionSummary>,
    pub summary: WeeklySummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub total_walks: usize,
    pub target_walks: usize,
    pub completion_rate: f64,
}

const WEEKLY_TARGET_WALKS: usize = 7;

/// Monday-based week bounds around the reference date.
pub fn week_bounds(reference: Date) -> (Date, Date) {
    let days_from_monday = reference.weekday().number_days_from_monday() as i64;
    let week_start = reference - Duration::days(days_from_monday);
    (week_start, week_start + Duration::days(6))
}

pub async fn get_weekly_walk_sessions(
    pool: &PgPool,
    elderly_id: Uuid,
    week_start: Option<Date>,
) -> AppResult<WeeklyWalks> {
    let reference = week_start.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let (start, end) = week_bounds(reference);

    let sessions = WalkRepository::find_walks_in_range(pool, elderly_id, start, end).await?;
    let completed = sessions
        .iter()
        .filter(|s| s.status == WalkSessionStatus::Completed)
        .count();

    Ok(WeeklyWalks {
        week_start: format_date(start),
        week_end: format_date(end),
        sessions: sessions.iter().map(WalkSessionSummary::from_session).collect(),
        summary: WeeklySummary {
            total_walks: completed,
            target_walks: WEEKLY_TARGET_WALKS,
            completion_rate: round_rate(completed as f64 / WEEKLY_TARGET_WALKS as f64 * 100.0),
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    AllTime,
    Month,
    Year,
}

impl StatsPeriod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all-time" => Some(StatsPeriod::AllTime),
            "month" => Some(StatsPeriod::Month),
            "year" => Some(StatsPeriod::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStatistics {
    pub total_walks: i64,
    pub completed_walks: i64,
    pub total_duration_minutes: i64,
    pub avg_duration_minutes: f64,
    pub completion_rate: f64,
}

pub async fn get_walk_statistics(
    pool: &PgPool,
    elderly_id: Uuid,
    period: StatsPeriod,
) -> AppResult<WalkStatistics> {
    let today = OffsetDateTime::now_utc().date();
    let since = match period {
        StatsPeriod::AllTime => None,
        StatsPeriod::Month => Some(today.replace_day(1).expect("day 1 is always valid")),
        StatsPeriod::Year => Some(
            Date::from_calendar_date(today.year(), time::Month::January, 1)
                .expect("January 1 is always valid"),
        ),
    };

    let stats = WalkRepository::walk_statistics(pool, elderly_id, since).await?;
    let completion_rate = if stats.total_walks > 0 {
        round_rate(stats.completed_walks as f64 / stats.total_walks as f64 * 100.0)
    } else {
        0.0
    };

    Ok(WalkStatistics {
        total_walks: stats.total_walks,
        completed_walks: stats.completed_walks,
        total_duration_minutes: stats.total_duration_minutes,
        avg_duration_minutes: stats.avg_duration_minutes,
        completion_rate,
    })
}

fn round_rate(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Guarded status transition. Only a party on the session may move it,
/// and only along the forward-only lifecycle.
pub async fn update_walk_status(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
    payload: &UpdateWalkStatusPayload,
) -> AppResult<WalkSessionSummary> {
    let session = WalkRepository::find_walk_session_by_id(pool, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Walk session not found".to_string()))?;

    let next = WalkSessionStatus::from_client_label(&payload.status).ok_or_else(|| {
        AppError::Validation(format!("Unknown session status '{}'", payload.status))
    })?;

    if !caller_is_party(pool, user_id, &session).await? {
        return Err(AppError::NotFound("Walk session not found".to_string()));
    }

    if !session.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot move session from '{}' to '{}'",
            session.status.client_label(),
            next.client_label()
        )));
    }

    let updated = WalkRepository::update_walk_status(
        pool,
        session_id,
        next,
        payload.cancellation_reason.as_deref(),
    )
    .await?;

    Ok(WalkSessionSummary::from_session(&updated))
}

async fn caller_is_party(
    pool: &PgPool,
    user_id: Uuid,
    session: &WalkSession,
) -> AppResult<bool> {
    if let Some(profile) = ElderlyRepository::find_by_user_id(pool, user_id).await? {
        if profile.id == session.elderly_id {
            return Ok(true);
        }
    }
    if let Some(nurse) = NurseRepository::find_nurse_by_user_id(pool, user_id).await? {
        if nurse.id == session.nurse_id {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::AvailabilityStatus;
    use time::macros::date;

    fn candidate(rating: f64) -> NurseCandidate {
        NurseCandidate {
            profile: NurseProfile {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: "Nurse".to_string(),
                phone: "555-0100".to_string(),
                gender: "female".to_string(),
                profile_picture: None,
                specializations: vec![],
                experience_years: 1,
                max_patients_per_day: 3,
                address: "1 Main St".to_string(),
                rating,
                total_walks: 0,
                availability_status: AvailabilityStatus::Available,
                created_at: OffsetDateTime::UNIX_EPOCH,
                updated_at: OffsetDateTime::UNIX_EPOCH,
            },
            windows: vec![],
            booked: vec![],
        }
    }

    #[test]
    fn matcher_prefers_highest_rating_and_breaks_ties_by_order() {
        let candidates = vec![candidate(3.0), candidate(4.5), candidate(4.5)];
        let expected = candidates[1].profile.id;

        let picked = pick_first_highest_rated(candidates).unwrap();
        assert_eq!(picked.profile.rating, 4.5);
        assert_eq!(picked.profile.id, expected);
    }

    #[test]
    fn matcher_on_empty_candidate_set_returns_none() {
        assert!(pick_first_highest_rated(vec![]).is_none());
    }

    #[test]
    fn week_bounds_are_monday_through_sunday() {
        // 2026-08-06 is a Thursday
        let (start, end) = week_bounds(date!(2026 - 08 - 06));
        assert_eq!(start, date!(2026 - 08 - 03));
        assert_eq!(end, date!(2026 - 08 - 09));

        // a Monday reference is its own week start
        let (start, end) = week_bounds(date!(2026 - 08 - 03));
        assert_eq!(start, date!(2026 - 08 - 03));
        assert_eq!(end, date!(2026 - 08 - 09));
    }

    #[test]
    fn slot_labels_use_twelve_hour_clock() {
        assert_eq!(twelve_hour_label(8), "8:00 AM");
        assert_eq!(twelve_hour_label(12), "12:00 PM");
        assert_eq!(twelve_hour_label(18), "6:00 PM");
    }

    #[test]
    fn matching_score_projects_rating_to_percent() {
        assert_eq!(matching_score(4.5), 90);
        assert_eq!(matching_score(0.0), 0);
        assert_eq!(matching_score(5.0), 100);
    }

    #[test]
    fn scheduled_time_must_be_well_formed() {
        assert!(parse_scheduled_time("09:00").is_ok());
        assert!(parse_scheduled_time("9").is_err());
        assert!(parse_scheduled_time("midnight").is_err());
    }
}

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::db::models::{NurseAvailability, NurseProfile, WalkSession, WalkSessionStatus};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

static TIME_OF_DAY_FMT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
static DATE_FMT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One nurse with everything the evaluator needs loaded up front: their
/// windows and the sessions already blocking their time on the target date.
#[derive(Debug, Clone)]
pub struct NurseCandidate {
    pub profile: NurseProfile,
    pub windows: Vec<NurseAvailability>,
    pub booked: Vec<WalkSession>,
}

pub fn parse_time_of_day(value: &str) -> Result<Time, time::error::Parse> {
    Time::parse(value, TIME_OF_DAY_FMT)
}

pub fn format_time_of_day(value: Time) -> String {
    value
        .format(TIME_OF_DAY_FMT)
        .unwrap_or_else(|_| value.to_string())
}

pub fn format_date(value: Date) -> String {
    value.format(DATE_FMT).unwrap_or_else(|_| value.to_string())
}

/// Day-of-week index as stored in availability windows: 0 = Sunday.
pub fn day_of_week_index(date: Date) -> i32 {
    date.weekday().number_days_from_sunday() as i32
}

fn minutes_of(value: Time) -> i32 {
    value.hour() as i32 * 60 + value.minute() as i32
}

/// Sessions are confined to a single calendar day.
pub fn crosses_midnight(start: Time, duration_minutes: i32) -> bool {
    minutes_of(start) + duration_minutes > MINUTES_PER_DAY
}

fn window_applies(window: &NurseAvailability, date: Date, day_of_week: i32) -> bool {
    (window.is_recurring && window.day_of_week == day_of_week)
        || window.specific_date == Some(date)
}

fn window_covers(window: &NurseAvailability, start_min: i32, end_min: i32) -> bool {
    minutes_of(window.start_time) <= start_min && end_min <= minutes_of(window.end_time)
}

fn intervals_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && b_start < a_end
}

fn blocks_time(session: &WalkSession, date: Date) -> bool {
    session.scheduled_date == date
        && !matches!(
            session.status,
            WalkSessionStatus::Cancelled | WalkSessionStatus::Rejected
        )
}

/// Decide whether one nurse can be booked for `[start, start + duration)`
/// on `date`:
///
/// 1. at least one applicable window (recurring on the day-of-week, or
///    one-off on the exact date) fully contains the requested interval;
/// 2. no session that blocks the nurse's time overlaps the interval;
/// 3. the nurse is below their daily capacity.
///
/// Intervals crossing midnight are never bookable (single-day model).
pub fn is_nurse_available(
    candidate: &NurseCandidate,
    date: Date,
    start: Time,
    duration_minutes: i32,
) -> bool {
    let start_min = minutes_of(start);
    let end_min = start_min + duration_minutes;
    if duration_minutes <= 0 || end_min > MINUTES_PER_DAY {
        return false;
    }

    let day_of_week = day_of_week_index(date);
    let covered = candidate
        .windows
        .iter()
        .filter(|w| window_applies(w, date, day_of_week))
        .any(|w| window_covers(w, start_min, end_min));
    if !covered {
        return false;
    }

    let blocking: Vec<&WalkSession> = candidate
        .booked
        .iter()
        .filter(|s| blocks_time(s, date))
        .collect();

    let overlaps = blocking.iter().any(|s| {
        let booked_start = minutes_of(s.scheduled_time);
        intervals_overlap(
            start_min,
            end_min,
            booked_start,
            booked_start + s.duration_minutes,
        )
    });
    if overlaps {
        return false;
    }

    (blocking.len() as i32) < candidate.profile.max_patients_per_day
}

/// Keep the candidates the evaluator accepts, preserving input order.
pub fn filter_available_nurses(
    candidates: Vec<NurseCandidate>,
    date: Date,
    start: Time,
    duration_minutes: i32,
) -> Vec<NurseCandidate> {
    candidates
        .into_iter()
        .filter(|c| is_nurse_available(c, date, start, duration_minutes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::AvailabilityStatus;
    use time::macros::{date, time};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn nurse(max_patients_per_day: i32) -> NurseProfile {
        NurseProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Test Nurse".to_string(),
            phone: "555-0100".to_string(),
            gender: "female".to_string(),
            profile_picture: None,
            specializations: vec!["mobility".to_string()],
            experience_years: 5,
            max_patients_per_day,
            address: "1 Main St".to_string(),
            rating: 4.2,
            total_walks: 10,
            availability_status: AvailabilityStatus::Available,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn recurring_window(nurse_id: Uuid, day_of_week: i32, start: Time, end: Time) -> NurseAvailability {
        NurseAvailability {
            id: Uuid::new_v4(),
            nurse_id,
            day_of_week,
            start_time: start,
            end_time: end,
            is_recurring: true,
            specific_date: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn one_off_window(nurse_id: Uuid, on: Date, start: Time, end: Time) -> NurseAvailability {
        NurseAvailability {
            id: Uuid::new_v4(),
            nurse_id,
            // one-off windows still carry the column, but it is not consulted
            day_of_week: day_of_week_index(on),
            start_time: start,
            end_time: end,
            is_recurring: false,
            specific_date: Some(on),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn session(
        nurse_id: Uuid,
        on: Date,
        at: Time,
        duration_minutes: i32,
        status: WalkSessionStatus,
    ) -> WalkSession {
        WalkSession {
            id: Uuid::new_v4(),
            elderly_id: Uuid::new_v4(),
            nurse_id,
            scheduled_date: on,
            scheduled_time: at,
            duration_minutes,
            status,
            cancellation_reason: None,
            actual_start_time: None,
            actual_end_time: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    // 2026-08-03 is a Monday.
    const MONDAY: Date = date!(2026 - 08 - 03);

    fn monday_morning_candidate() -> NurseCandidate {
        let profile = nurse(3);
        let windows = vec![recurring_window(
            profile.id,
            day_of_week_index(MONDAY),
            time!(08:00),
            time!(12:00),
        )];
        NurseCandidate {
            profile,
            windows,
            booked: vec![],
        }
    }

    #[test]
    fn unavailable_without_any_applicable_window() {
        let candidate = NurseCandidate {
            profile: nurse(3),
            windows: vec![],
            booked: vec![],
        };
        assert!(!is_nurse_available(&candidate, MONDAY, time!(09:00), 30));
    }

    #[test]
    fn available_inside_recurring_window_with_no_bookings() {
        let candidate = monday_morning_candidate();
        assert!(is_nurse_available(&candidate, MONDAY, time!(09:00), 30));
    }

    #[test]
    fn unavailable_when_interval_extends_past_window_end() {
        let candidate = monday_morning_candidate();
        // 11:45 + 30min runs past the 12:00 window end
        assert!(!is_nurse_available(&candidate, MONDAY, time!(11:45), 30));
    }

    #[test]
    fn window_on_wrong_weekday_does_not_apply() {
        let candidate = monday_morning_candidate();
        let tuesday = date!(2026 - 08 - 04);
        assert!(!is_nurse_available(&candidate, tuesday, time!(09:00), 30));
    }

    #[test]
    fn one_off_window_applies_only_on_its_date() {
        let profile = nurse(3);
        let windows = vec![one_off_window(profile.id, MONDAY, time!(14:00), time!(16:00))];
        let candidate = NurseCandidate {
            profile,
            windows,
            booked: vec![],
        };
        assert!(is_nurse_available(&candidate, MONDAY, time!(14:30), 60));
        // same weekday one week later: the window is not recurring
        let next_monday = date!(2026 - 08 - 10);
        assert!(!is_nurse_available(&candidate, next_monday, time!(14:30), 60));
    }

    #[test]
    fn overlapping_booking_blocks_regardless_of_window_coverage() {
        let mut candidate = monday_morning_candidate();
        let nurse_id = candidate.profile.id;
        candidate.booked = vec![session(
            nurse_id,
            MONDAY,
            time!(09:00),
            60,
            WalkSessionStatus::Scheduled,
        )];
        assert!(!is_nurse_available(&candidate, MONDAY, time!(09:30), 30));
        // back-to-back is fine: [08:30, 09:00) touches but does not overlap
        assert!(is_nurse_available(&candidate, MONDAY, time!(08:30), 30));
        assert!(is_nurse_available(&candidate, MONDAY, time!(10:00), 30));
    }

    #[test]
    fn cancelled_and_rejected_sessions_do_not_block() {
        let mut candidate = monday_morning_candidate();
        let nurse_id = candidate.profile.id;
        candidate.booked = vec![
            session(nurse_id, MONDAY, time!(09:00), 60, WalkSessionStatus::Cancelled),
            session(nurse_id, MONDAY, time!(09:00), 60, WalkSessionStatus::Rejected),
        ];
        assert!(is_nurse_available(&candidate, MONDAY, time!(09:30), 30));
    }

    #[test]
    fn nurse_at_daily_capacity_is_unavailable() {
        let mut candidate = monday_morning_candidate();
        candidate.profile.max_patients_per_day = 1;
        let nurse_id = candidate.profile.id;
        candidate.booked = vec![session(
            nurse_id,
            MONDAY,
            time!(08:00),
            30,
            WalkSessionStatus::Confirmed,
        )];
        // 10:00 fits the window and does not overlap, but capacity is spent
        assert!(!is_nurse_available(&candidate, MONDAY, time!(10:00), 30));
    }

    #[test]
    fn interval_crossing_midnight_is_rejected() {
        let profile = nurse(3);
        let windows = vec![recurring_window(
            profile.id,
            day_of_week_index(MONDAY),
            time!(00:00),
            time!(23:59),
        )];
        let candidate = NurseCandidate {
            profile,
            windows,
            booked: vec![],
        };
        assert!(!is_nurse_available(&candidate, MONDAY, time!(23:30), 60));
    }

    #[test]
    fn filter_on_empty_input_returns_empty() {
        let filtered = filter_available_nurses(vec![], MONDAY, time!(09:00), 30);
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_preserves_input_order() {
        let available = monday_morning_candidate();
        let unavailable = NurseCandidate {
            profile: nurse(3),
            windows: vec![],
            booked: vec![],
        };
        let second_available = monday_morning_candidate();

        let first_id = available.profile.id;
        let third_id = second_available.profile.id;
        let filtered = filter_available_nurses(
            vec![available, unavailable, second_available],
            MONDAY,
            time!(09:00),
            30,
        );
        let ids: Vec<_> = filtered.iter().map(|c| c.profile.id).collect();
        assert_eq!(ids, vec![first_id, third_id]);
    }

    #[test]
    fn time_of_day_parsing_and_formatting() {
        let parsed = parse_time_of_day("09:30").unwrap();
        assert_eq!(parsed, time!(09:30));
        assert!(parse_time_of_day("9am").is_err());
        assert!(parse_time_of_day("25:00").is_err());
        assert_eq!(format_time_of_day(time!(08:05)), "08:05");
        assert_eq!(format_date(date!(2026 - 08 - 03)), "2026-08-03");
    }

    #[test]
    fn sunday_maps_to_zero() {
        let sunday = date!(2026 - 08 - 02);
        assert_eq!(day_of_week_index(sunday), 0);
        assert_eq!(day_of_week_index(MONDAY), 1);
        let saturday = date!(2026 - 08 - 08);
        assert_eq!(day_of_week_index(saturday), 6);
    }
}

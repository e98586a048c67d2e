use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

/// One bookable time-of-day window. Recurring windows repeat on
/// `day_of_week` (0 = Sunday); one-off windows apply to `specific_date`
/// only. Times are local time-of-day, never timezone-aware instants.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct NurseAvailability {
    pub id: Uuid,
    pub nurse_id: Uuid,
    pub day_of_week: i32,
    pub start_time: Time,
    pub end_time: Time,
    pub is_recurring: bool,
    pub specific_date: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Parsed, validated window ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAvailabilityWindow {
    pub day_of_week: i32,
    pub start_time: Time,
    pub end_time: Time,
    pub is_recurring: bool,
    pub specific_date: Option<Date>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlotPayload {
    #[validate(range(min = 0, max = 6, message = "Day of week must be 0-6"))]
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_recurring: Option<bool>,
    pub specific_date: Option<Date>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAvailabilityPayload {
    #[validate(length(min = 1, message = "At least one availability slot is required"))]
    pub slots: Vec<AvailabilitySlotPayload>,
}

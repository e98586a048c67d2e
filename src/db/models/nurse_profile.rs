use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "availability_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Busy,
    Offline,
    Reserved,
    Suspended,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct NurseProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub gender: String,
    pub profile_picture: Option<String>,
    pub specializations: Vec<String>,
    pub experience_years: i32,
    pub max_patients_per_day: i32,
    pub address: String,
    pub rating: f64,
    pub total_walks: i32,
    pub availability_status: AvailabilityStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNurseProfile {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub specializations: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub experience_years: Option<i32>,
    #[validate(range(min = 1, message = "Capacity must allow at least one patient"))]
    pub max_patients_per_day: Option<i32>,
    pub address: Option<String>,
    pub availability_status: Option<AvailabilityStatus>,
}

use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ElderlyProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_of_birth: Date,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub profile_picture: Option<String>,
    pub walks_remaining: i32,
    pub walks_used_this_month: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::ElderlyProfile;
use crate::db::DatabaseError;

const ELDERLY_COLUMNS: &str = "id, user_id, name, date_of_birth, gender, phone, address, \
     profile_picture, walks_remaining, walks_used_this_month, created_at, updated_at";

pub struct ElderlyRepository;

impl ElderlyRepository {
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<ElderlyProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, ElderlyProfile>(&format!(
            "SELECT {ELDERLY_COLUMNS} FROM elderly_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }
}

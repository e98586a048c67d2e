use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use crate::db::models::{NewAvailabilityWindow, NurseAvailability, NurseProfile, UpdateNurseProfile};
use crate::db::DatabaseError;

const NURSE_COLUMNS: &str = "id, user_id, name, phone, gender, profile_picture, \
     specializations, experience_years, max_patients_per_day, address, rating, \
     total_walks, availability_status, created_at, updated_at";

pub struct NurseRepository;

impl NurseRepository {
    pub async fn find_nurse_by_id(
        pool: &PgPool,
        nurse_id: Uuid,
    ) -> Result<Option<NurseProfile>, DatabaseError> {
        let nurse = sqlx::query_as::<_, NurseProfile>(&format!(
            "SELECT {NURSE_COLUMNS} FROM nurse_profiles WHERE id = $1"
        ))
        .bind(nurse_id)
        .fetch_optional(pool)
        .await?;

        Ok(nurse)
    }

    pub async fn find_nurse_by_user_id(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<NurseProfile>, DatabaseError> {
        let nurse = sqlx::query_as::<_, NurseProfile>(&format!(
            "SELECT {NURSE_COLUMNS} FROM nurse_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(nurse)
    }

    /// Plain listing of bookable nurses, optionally narrowed to a
    /// specialization.
    pub async fn find_available_nurses(
        pool: &PgPool,
        specialization: Option<&str>,
    ) -> Result<Vec<NurseProfile>, DatabaseError> {
        let nurses = sqlx::query_as::<_, NurseProfile>(&format!(
            r#"
            SELECT {NURSE_COLUMNS}
            FROM nurse_profiles
            WHERE availability_status = 'available'
              AND ($1::text IS NULL OR $1 = ANY(specializations))
            ORDER BY rating DESC, created_at ASC
            "#
        ))
        .bind(specialization)
        .fetch_all(pool)
        .await?;

        Ok(nurses)
    }

    /// Coarse candidate filter for matching: nurses marked available that
    /// have any window touching the target day-of-week or specific date.
    /// Ordered by rating so the matcher's tie-break stays deterministic.
    pub async fn find_candidate_nurses(
        pool: &PgPool,
        day_of_week: i32,
        date: Date,
        specialization: Option<&str>,
    ) -> Result<Vec<NurseProfile>, DatabaseError> {
        let nurses = sqlx::query_as::<_, NurseProfile>(
            r#"
            SELECT DISTINCT n.id, n.user_id, n.name, n.phone, n.gender, n.profile_picture,
                   n.specializations, n.experience_years, n.max_patients_per_day, n.address,
                   n.rating, n.total_walks, n.availability_status, n.created_at, n.updated_at
            FROM nurse_profiles n
            JOIN nurse_availability a ON a.nurse_id = n.id
            WHERE n.availability_status = 'available'
              AND ((a.is_recurring AND a.day_of_week = $1) OR a.specific_date = $2)
              AND ($3::text IS NULL OR $3 = ANY(n.specializations))
            ORDER BY n.rating DESC, n.created_at ASC
            "#,
        )
        .bind(day_of_week)
        .bind(date)
        .bind(specialization)
        .fetch_all(pool)
        .await?;

        Ok(nurses)
    }

    pub async fn find_availability_windows(
        pool: &PgPool,
        nurse_id: Uuid,
    ) -> Result<Vec<NurseAvailability>, DatabaseError> {
        let windows = sqlx::query_as::<_, NurseAvailability>(
            r#"
            SELECT id, nurse_id, day_of_week, start_time, end_time, is_recurring,
                   specific_date, created_at, updated_at
            FROM nurse_availability
            WHERE nurse_id = $1
            ORDER BY day_of_week ASC, start_time ASC
            "#,
        )
        .bind(nurse_id)
        .fetch_all(pool)
        .await?;

        Ok(windows)
    }

    pub async fn find_availability_windows_for_nurses(
        pool: &PgPool,
        nurse_ids: &[Uuid],
    ) -> Result<Vec<NurseAvailability>, DatabaseError> {
        let windows = sqlx::query_as::<_, NurseAvailability>(
            r#"
            SELECT id, nurse_id, day_of_week, start_time, end_time, is_recurring,
                   specific_date, created_at, updated_at
            FROM nurse_availability
            WHERE nurse_id = ANY($1)
            "#,
        )
        .bind(nurse_ids)
        .fetch_all(pool)
        .await?;

        Ok(windows)
    }

    /// Replace a nurse's windows wholesale inside one transaction.
    pub async fn replace_availability(
        tx: &mut Transaction<'_, Postgres>,
        nurse_id: Uuid,
        windows: &[NewAvailabilityWindow],
    ) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM nurse_availability WHERE nurse_id = $1")
            .bind(nurse_id)
            .execute(&mut **tx)
            .await?;

        for window in windows {
            sqlx::query(
                r#"
                INSERT INTO nurse_availability
                    (nurse_id, day_of_week, start_time, end_time, is_recurring, specific_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(nurse_id)
            .bind(window.day_of_week)
            .bind(window.start_time)
            .bind(window.end_time)
            .bind(window.is_recurring)
            .bind(window.specific_date)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn update_profile(
        pool: &PgPool,
        nurse_id: Uuid,
        data: &UpdateNurseProfile,
    ) -> Result<NurseProfile, DatabaseError> {
        let nurse = sqlx::query_as::<_, NurseProfile>(&format!(
            r#"
            UPDATE nurse_profiles
            SET
                name = COALESCE($1, name),
                phone = COALESCE($2, phone),
                profile_picture = COALESCE($3, profile_picture),
                specializations = COALESCE($4, specializations),
                experience_years = COALESCE($5, experience_years),
                max_patients_per_day = COALESCE($6, max_patients_per_day),
                address = COALESCE($7, address),
                availability_status = COALESCE($8::availability_status, availability_status),
                updated_at = NOW()
            WHERE id = $9
            RETURNING {NURSE_COLUMNS}
            "#
        ))
        .bind(data.name.as_deref())
        .bind(data.phone.as_deref())
        .bind(data.profile_picture.as_deref())
        .bind(data.specializations.as_deref())
        .bind(data.experience_years)
        .bind(data.max_patients_per_day)
        .bind(data.address.as_deref())
        .bind(data.availability_status)
        .bind(nurse_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Ok(nurse)
    }
}

use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use crate::db::models::{NewWalkSession, WalkSession, WalkSessionStatus};
use crate::db::DatabaseError;

const SESSION_COLUMNS: &str = "id, elderly_id, nurse_id, scheduled_date, scheduled_time, \
     duration_minutes, status, cancellation_reason, actual_start_time, actual_end_time, \
     created_at, updated_at";

pub struct WalkRepository;

impl WalkRepository {
    /// Insert one session row; the overlap EXCLUDE constraint turns a
    /// concurrent double-booking into a Conflict here.
    pub async fn create_walk_session(
        tx: &mut Transaction<'_, Postgres>,
        data: &NewWalkSession,
    ) -> Result<WalkSession, DatabaseError> {
        let session = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            INSERT INTO walk_sessions
                (elderly_id, nurse_id, scheduled_date, scheduled_time, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(data.elderly_id)
        .bind(data.nurse_id)
        .bind(data.scheduled_date)
        .bind(data.scheduled_time)
        .bind(data.duration_minutes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(session)
    }

    pub async fn find_walk_session_by_id(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<Option<WalkSession>, DatabaseError> {
        let session = sqlx::query_as::<_, WalkSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM walk_sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Sessions that block a nurse's time: everything not cancelled or
    /// rejected on the given date, for the given set of nurses.
    pub async fn find_blocking_sessions_for_nurses(
        pool: &PgPool,
        nurse_ids: &[Uuid],
        date: Date,
    ) -> Result<Vec<WalkSession>, DatabaseError> {
        let sessions = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM walk_sessions
            WHERE nurse_id = ANY($1)
              AND scheduled_date = $2
              AND status NOT IN ('cancelled', 'rejected')
            "#
        ))
        .bind(nurse_ids)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    pub async fn find_walks_by_elderly(
        pool: &PgPool,
        elderly_id: Uuid,
        status: Option<WalkSessionStatus>,
        start_date: Option<Date>,
        end_date: Option<Date>,
        limit: Option<i64>,
    ) -> Result<Vec<WalkSession>, DatabaseError> {
        let sessions = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM walk_sessions
            WHERE elderly_id = $1
              AND ($2::walk_session_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR scheduled_date >= $3)
              AND ($4::date IS NULL OR scheduled_date <= $4)
            ORDER BY scheduled_date DESC, scheduled_time DESC
            LIMIT $5
            "#
        ))
        .bind(elderly_id)
        .bind(status)
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    pub async fn find_today_walk(
        pool: &PgPool,
        elderly_id: Uuid,
        today: Date,
    ) -> Result<Option<WalkSession>, DatabaseError> {
        let session = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM walk_sessions
            WHERE elderly_id = $1 AND scheduled_date = $2
            ORDER BY scheduled_time ASC
            LIMIT 1
            "#
        ))
        .bind(elderly_id)
        .bind(today)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    pub async fn find_walks_in_range(
        pool: &PgPool,
        elderly_id: Uuid,
        start_date: Date,
        end_date: Date,
    ) -> Result<Vec<WalkSession>, DatabaseError> {
        let sessions = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM walk_sessions
            WHERE elderly_id = $1
              AND scheduled_date >= $2
              AND scheduled_date <= $3
            ORDER BY scheduled_date ASC, scheduled_time ASC
            "#
        ))
        .bind(elderly_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    pub async fn update_walk_status(
        pool: &PgPool,
        session_id: Uuid,
        status: WalkSessionStatus,
        cancellation_reason: Option<&str>,
    ) -> Result<WalkSession, DatabaseError> {
        let session = sqlx::query_as::<_, WalkSession>(&format!(
            r#"
            UPDATE walk_sessions
            SET
                status = $1,
                cancellation_reason = COALESCE($2, cancellation_reason),
                actual_start_time = CASE
                    WHEN $1 = 'in_progress'::walk_session_status THEN NOW()
                    ELSE actual_start_time
                END,
                actual_end_time = CASE
                    WHEN $1 = 'completed'::walk_session_status THEN NOW()
                    ELSE actual_end_time
                END,
                updated_at = NOW()
            WHERE id = $3
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(cancellation_reason)
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Ok(session)
    }

    pub async fn walk_statistics(
        pool: &PgPool,
        elderly_id: Uuid,
        since: Option<Date>,
    ) -> Result<WalkStatsRow, DatabaseError> {
        let stats = sqlx::query_as::<_, WalkStatsRow>(
            r#"
            SELECT COUNT(*) AS total_walks,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed_walks,
                   COALESCE(SUM(duration_minutes) FILTER (WHERE status = 'completed'), 0)::bigint
                       AS total_duration_minutes,
                   COALESCE(AVG(duration_minutes) FILTER (WHERE status = 'completed'), 0)::float8
                       AS avg_duration_minutes
            FROM walk_sessions
            WHERE elderly_id = $1
              AND ($2::date IS NULL OR scheduled_date >= $2)
            "#,
        )
        .bind(elderly_id)
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WalkStatsRow {
    pub total_walks: i64,
    pub completed_walks: i64,
    pub total_duration_minutes: i64,
    pub avg_duration_minutes: f64,
}

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::{
    error::StoreResult,
    models::{AttendanceEntry, AttendanceInput},
    store::AttendanceLog,
    types::AttendanceRow,
    utils::sql,
};

/// Postgres-backed attendance log (`registrations_done`).
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceLog for AttendanceRepository {
    async fn record_present(&self, input: AttendanceInput) -> StoreResult<AttendanceEntry> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, AttendanceRow>(&sql(r#"
            INSERT INTO
                registrations_done (
                    team_id,
                    team_name,
                    check_in_time,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, 'present', ?, ?)
            ON CONFLICT (team_id) DO UPDATE
            SET
                team_name = EXCLUDED.team_name,
                check_in_time = EXCLUDED.check_in_time,
                status = 'present',
                updated_at = EXCLUDED.updated_at
            RETURNING
                team_id,
                team_name,
                check_in_time,
                status,
                created_at,
                updated_at
        "#))
        .bind(input.team_id)
        .bind(input.team_name)
        .bind(input.check_in_time)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn mark_absent(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&sql(r#"
            UPDATE
                registrations_done
            SET
                status = 'absent',
                updated_at = ?
            WHERE
                team_id = ?
            RETURNING
                team_id,
                team_name,
                check_in_time,
                status,
                created_at,
                updated_at
        "#))
        .bind(Utc::now())
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceEntry::try_from).transpose()
    }

    async fn remove(&self, team_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(&sql("DELETE FROM registrations_done WHERE team_id = ?"))
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&sql(r#"
            SELECT
                team_id,
                team_name,
                check_in_time,
                status,
                created_at,
                updated_at
            FROM
                registrations_done
            WHERE
                team_id = ?
        "#))
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceEntry::try_from).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<AttendanceEntry>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql(r#"
            SELECT
                team_id,
                team_name,
                check_in_time,
                status,
                created_at,
                updated_at
            FROM
                registrations_done
            ORDER BY
                check_in_time ASC,
                team_id ASC
        "#))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceEntry::try_from).collect()
    }
}

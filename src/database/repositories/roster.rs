use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::{
    error::{StoreError, StoreResult},
    models::{CheckInOutcome, CheckInStats, TeamInput, TeamRecord},
    store::RosterStore,
    types::CheckInRow,
    utils::sql,
};

/// Postgres-backed roster (`selected_teams`).
#[derive(Clone)]
pub struct RosterRepository {
    pool: PgPool,
}

impl RosterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for RosterRepository {
    async fn try_check_in(&self, team_id: &str, at: DateTime<Utc>) -> StoreResult<CheckInOutcome> {
        // One statement: the conditional update, and when it misses, the row as
        // it stands once any competing writer has committed (FOR SHARE re-reads
        // the latest version).
        let row = sqlx::query_as::<_, CheckInRow>(&sql(r#"
            WITH updated AS (
                UPDATE
                    selected_teams
                SET
                    is_checked_in = TRUE,
                    check_in_time = ?,
                    updated_at = NOW()
                WHERE
                    team_id = ?
                    AND is_checked_in = FALSE
                RETURNING
                    team_id,
                    team_name,
                    college,
                    members,
                    contact_number,
                    email,
                    is_checked_in,
                    check_in_time,
                    created_at,
                    updated_at
            ),
            existing AS (
                SELECT
                    team_id,
                    team_name,
                    college,
                    members,
                    contact_number,
                    email,
                    is_checked_in,
                    check_in_time,
                    created_at,
                    updated_at
                FROM
                    selected_teams
                WHERE
                    team_id = ?
                    AND NOT EXISTS (SELECT 1 FROM updated)
                FOR SHARE
            )
            SELECT TRUE AS applied, * FROM updated
            UNION ALL
            SELECT FALSE AS applied, * FROM existing
        "#))
        .bind(at)
        .bind(team_id)
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(CheckInRow { applied: true, team }) => CheckInOutcome::CheckedIn(team),
            Some(CheckInRow { applied: false, team }) => CheckInOutcome::AlreadyCheckedIn(team),
            None => CheckInOutcome::NotFound,
        })
    }

    async fn try_undo_check_in(&self, team_id: &str) -> StoreResult<Option<TeamRecord>> {
        let team = sqlx::query_as::<_, TeamRecord>(&sql(r#"
            UPDATE
                selected_teams
            SET
                is_checked_in = FALSE,
                check_in_time = NULL,
                updated_at = NOW()
            WHERE
                team_id = ?
                AND is_checked_in = TRUE
            RETURNING
                team_id,
                team_name,
                college,
                members,
                contact_number,
                email,
                is_checked_in,
                check_in_time,
                created_at,
                updated_at
        "#))
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn find_by_team_id(&self, team_id: &str) -> StoreResult<Option<TeamRecord>> {
        let team = sqlx::query_as::<_, TeamRecord>(&sql(r#"
            SELECT
                team_id,
                team_name,
                college,
                members,
                contact_number,
                email,
                is_checked_in,
                check_in_time,
                created_at,
                updated_at
            FROM
                selected_teams
            WHERE
                team_id = ?
        "#))
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn list_all(&self) -> StoreResult<Vec<TeamRecord>> {
        let teams = sqlx::query_as::<_, TeamRecord>(&sql(r#"
            SELECT
                team_id,
                team_name,
                college,
                members,
                contact_number,
                email,
                is_checked_in,
                check_in_time,
                created_at,
                updated_at
            FROM
                selected_teams
            ORDER BY
                is_checked_in DESC,
                check_in_time DESC NULLS LAST,
                team_id ASC
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    async fn stats(&self) -> StoreResult<CheckInStats> {
        // One statement so total and checked_in come from the same snapshot.
        let (total, checked_in): (i64, i64) = sqlx::query_as(&sql(r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_checked_in)
            FROM
                selected_teams
        "#))
        .fetch_one(&self.pool)
        .await?;

        Ok(CheckInStats::from_counts(total, checked_in))
    }

    async fn insert_team(&self, input: TeamInput) -> StoreResult<TeamRecord> {
        let team_id = input.team_id.clone();

        sqlx::query_as::<_, TeamRecord>(&sql(r#"
            INSERT INTO
                selected_teams (
                    team_id,
                    team_name,
                    college,
                    members,
                    contact_number,
                    email
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                team_id,
                team_name,
                college,
                members,
                contact_number,
                email,
                is_checked_in,
                check_in_time,
                created_at,
                updated_at
        "#))
        .bind(input.team_id)
        .bind(input.team_name)
        .bind(input.college)
        .bind(input.members)
        .bind(input.contact_number)
        .bind(input.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, &team_id))
    }

    async fn clear(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM selected_teams")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

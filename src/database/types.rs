use chrono::{DateTime, Utc};

use super::error::StoreError;
use super::models::{AttendanceEntry, AttendanceStatus, TeamRecord};

/// A roster row from the conditional check-in, flagged with whether this
/// statement performed the transition.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckInRow {
    pub applied: bool,
    #[sqlx(flatten)]
    pub team: TeamRecord,
}

// Database row types that match the registrations_done schema
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub team_id: String,
    pub team_name: String,
    pub check_in_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceEntry {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AttendanceStatus>()
            .map_err(|e| StoreError::Corrupt(format!("{} (team {})", e, row.team_id)))?;

        Ok(Self {
            team_id: row.team_id,
            team_name: row.team_name,
            check_in_time: row.check_in_time,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

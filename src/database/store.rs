//! Store contracts for the roster and the attendance log.
//!
//! The service layer never reads a flag and writes it back: every state change
//! goes through `try_check_in` / `try_undo_check_in`, which backends implement
//! as a single conditional update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::error::StoreResult;
use crate::database::models::{
    AttendanceEntry, AttendanceInput, CheckInOutcome, CheckInStats, TeamInput, TeamRecord,
};

/// Roster of selected teams. Authoritative for "is this team checked in now".
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Pending -> checked-in, conditioned on the record being pending.
    ///
    /// `team_id` must already be normalized.
    async fn try_check_in(&self, team_id: &str, at: DateTime<Utc>) -> StoreResult<CheckInOutcome>;

    /// Checked-in -> pending. `None` when no checked-in record has that id.
    async fn try_undo_check_in(&self, team_id: &str) -> StoreResult<Option<TeamRecord>>;

    async fn find_by_team_id(&self, team_id: &str) -> StoreResult<Option<TeamRecord>>;

    /// All teams in dashboard order.
    async fn list_all(&self) -> StoreResult<Vec<TeamRecord>>;

    async fn stats(&self) -> StoreResult<CheckInStats>;

    /// Seed a new pending team. Fails with `Duplicate` on an existing id.
    async fn insert_team(&self, input: TeamInput) -> StoreResult<TeamRecord>;

    /// Remove every team. Only used by a replacing import.
    async fn clear(&self) -> StoreResult<u64>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}

/// Audit/export projection of completed check-ins, one entry per team.
#[async_trait]
pub trait AttendanceLog: Send + Sync {
    /// Insert or overwrite the entry for `input.team_id` with status `present`.
    async fn record_present(&self, input: AttendanceInput) -> StoreResult<AttendanceEntry>;

    /// Flip an entry to `absent`. `None` when no entry exists.
    async fn mark_absent(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>>;

    /// Delete an entry. Returns whether one existed.
    async fn remove(&self, team_id: &str) -> StoreResult<bool>;

    async fn find(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>>;

    /// All entries ordered by check-in time, oldest first.
    async fn list(&self) -> StoreResult<Vec<AttendanceEntry>>;
}

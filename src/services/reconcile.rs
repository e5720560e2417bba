use crate::database::{
    AttendanceLog, RosterStore, StoreResult,
    models::CheckInOutcome,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSummary {
    pub present_entries: usize,
    pub updated: usize,
    pub already_synced: usize,
    pub not_found: Vec<String>,
    /// Checked-in count on the roster after the pass.
    pub checked_in: i64,
}

impl SyncSummary {
    pub fn is_consistent(&self) -> bool {
        self.checked_in == self.present_entries as i64
    }
}

/// Re-apply every `present` attendance entry to the roster.
///
/// Uses the same conditional transition as a live check-in, with the logged
/// timestamp, so running it twice changes nothing.
pub async fn sync_roster_from_log(
    roster: &dyn RosterStore,
    attendance: &dyn AttendanceLog,
) -> StoreResult<SyncSummary> {
    let mut summary = SyncSummary::default();

    for entry in attendance.list().await? {
        if !entry.is_present() {
            continue;
        }
        summary.present_entries += 1;

        match roster
            .try_check_in(&entry.team_id, entry.check_in_time)
            .await?
        {
            CheckInOutcome::CheckedIn(team) => {
                log::info!("Marked {} ({}) as checked in", team.team_id, team.team_name);
                summary.updated += 1;
            }
            CheckInOutcome::AlreadyCheckedIn(_) => summary.already_synced += 1,
            CheckInOutcome::NotFound => {
                log::warn!("Team {} not found in roster", entry.team_id);
                summary.not_found.push(entry.team_id);
            }
        }
    }

    summary.checked_in = roster.stats().await?.checked_in;
    if !summary.is_consistent() {
        log::warn!(
            "Roster has {} checked-in teams but the log has {} present entries",
            summary.checked_in,
            summary.present_entries
        );
    }

    Ok(summary)
}

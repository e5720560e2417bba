use std::sync::Arc;

use chrono::Utc;

use crate::config::UndoPolicy;
use crate::database::{
    AttendanceLog, RosterStore, Stores,
    models::{AttendanceInput, CheckInOutcome, TeamRecord, TeamView, normalize_team_id},
};
use crate::error::AppError;

/// Who triggered a check-in. Only affects logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInSource {
    Team,
    Operator,
}

impl std::fmt::Display for CheckInSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckInSource::Team => write!(f, "self-service"),
            CheckInSource::Operator => write!(f, "manual"),
        }
    }
}

/// Check-in state machine over the roster and the attendance log.
///
/// The roster transition is the only step that decides success. The attendance
/// write that follows is best effort: its failures are logged and dropped.
#[derive(Clone)]
pub struct CheckInService {
    roster: Arc<dyn RosterStore>,
    attendance: Arc<dyn AttendanceLog>,
    undo_policy: UndoPolicy,
}

impl CheckInService {
    pub fn new(stores: &Stores, undo_policy: UndoPolicy) -> Self {
        Self {
            roster: Arc::clone(&stores.roster),
            attendance: Arc::clone(&stores.attendance),
            undo_policy,
        }
    }

    pub async fn check_in(&self, raw_team_id: &str) -> Result<TeamView, AppError> {
        self.check_in_as(raw_team_id, CheckInSource::Team).await
    }

    pub async fn manual_check_in(&self, raw_team_id: &str) -> Result<TeamView, AppError> {
        self.check_in_as(raw_team_id, CheckInSource::Operator).await
    }

    async fn check_in_as(
        &self,
        raw_team_id: &str,
        source: CheckInSource,
    ) -> Result<TeamView, AppError> {
        let team_id = normalize_team_id(raw_team_id).ok_or(AppError::InvalidInput)?;

        match self.roster.try_check_in(&team_id, Utc::now()).await? {
            CheckInOutcome::CheckedIn(team) => {
                log::info!(
                    "Team {} ({}) checked in ({})",
                    team.team_id,
                    team.team_name,
                    source
                );
                self.record_attendance(&team).await;
                Ok(team.into())
            }
            CheckInOutcome::AlreadyCheckedIn(team) => {
                log::warn!("Rejected {} check-in for {}: already checked in", source, team_id);
                Err(AppError::AlreadyCheckedIn {
                    team_id: team.team_id,
                    team_name: team.team_name,
                    check_in_time: team.check_in_time,
                })
            }
            CheckInOutcome::NotFound => {
                log::warn!("Rejected {} check-in for unknown team {}", source, team_id);
                Err(AppError::NotFound)
            }
        }
    }

    async fn record_attendance(&self, team: &TeamRecord) {
        let Some(check_in_time) = team.check_in_time else {
            log::error!(
                "Team {} reported checked in without a check-in time",
                team.team_id
            );
            return;
        };

        let input = AttendanceInput {
            team_id: team.team_id.clone(),
            team_name: team.team_name.clone(),
            check_in_time,
        };
        if let Err(e) = self.attendance.record_present(input).await {
            log::error!(
                "Error saving attendance entry for {}: {}",
                team.team_id,
                e
            );
        }
    }

    pub async fn undo_check_in(&self, raw_team_id: &str) -> Result<TeamView, AppError> {
        let team_id = normalize_team_id(raw_team_id).ok_or(AppError::InvalidInput)?;

        let team = self
            .roster
            .try_undo_check_in(&team_id)
            .await?
            .ok_or_else(|| {
                log::warn!("Rejected undo for {}: not checked in", team_id);
                AppError::NotCheckedIn
            })?;

        log::info!("Check-in undone for team {} ({})", team.team_id, team.team_name);
        self.reconcile_undo(&team.team_id).await;

        Ok(team.into())
    }

    async fn reconcile_undo(&self, team_id: &str) {
        let result = match self.undo_policy {
            UndoPolicy::MarkAbsent => self
                .attendance
                .mark_absent(team_id)
                .await
                .map(|entry| entry.is_some()),
            UndoPolicy::Delete => self.attendance.remove(team_id).await,
        };

        match result {
            Ok(true) => {}
            Ok(false) => log::warn!("No attendance entry to update for {}", team_id),
            Err(e) => log::error!("Error updating attendance entry for {}: {}", team_id, e),
        }
    }

    /// Current roster record for a team.
    pub async fn status(&self, raw_team_id: &str) -> Result<TeamRecord, AppError> {
        let team_id = normalize_team_id(raw_team_id).ok_or(AppError::InvalidInput)?;

        self.roster
            .find_by_team_id(&team_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        StoreError, StoreResult,
        memory::{InMemoryAttendanceLog, InMemoryRoster},
        models::{AttendanceEntry, AttendanceStatus, TeamInput},
    };
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn team(id: &str, name: &str) -> TeamInput {
        TeamInput {
            team_id: id.to_string(),
            team_name: name.to_string(),
            college: "Malnad College of Engineering".to_string(),
            members: vec!["Asha".to_string(), "Ravi".to_string()],
            contact_number: "9876543210".to_string(),
            email: "team@example.com".to_string(),
        }
    }

    fn stores() -> Stores {
        Stores::new(
            Arc::new(InMemoryRoster::with_teams([
                team("H1", "Alpha"),
                team("H2", "Beta"),
            ])),
            Arc::new(InMemoryAttendanceLog::new()),
        )
    }

    struct BrokenAttendanceLog;

    #[async_trait]
    impl AttendanceLog for BrokenAttendanceLog {
        async fn record_present(&self, _input: AttendanceInput) -> StoreResult<AttendanceEntry> {
            Err(StoreError::LockPoisoned)
        }

        async fn mark_absent(&self, _team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
            Err(StoreError::LockPoisoned)
        }

        async fn remove(&self, _team_id: &str) -> StoreResult<bool> {
            Err(StoreError::LockPoisoned)
        }

        async fn find(&self, _team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
            Err(StoreError::LockPoisoned)
        }

        async fn list(&self) -> StoreResult<Vec<AttendanceEntry>> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[tokio::test]
    async fn test_second_check_in_is_rejected() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let view = service.check_in("H1").await.unwrap();
        assert_eq!(view.team_id, "H1");
        assert_eq!(view.team_name, "Alpha");
        assert!(view.check_in_time.is_some());

        match service.check_in("H1").await {
            Err(AppError::AlreadyCheckedIn {
                team_id,
                check_in_time,
                ..
            }) => {
                assert_eq!(team_id, "H1");
                assert_eq!(check_in_time, view.check_in_time);
            }
            other => panic!("expected AlreadyCheckedIn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_team_id_is_normalized() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let view = service.check_in(" h1 ").await.unwrap();
        assert_eq!(view.team_id, "H1");
        assert!(matches!(
            service.check_in("H1").await,
            Err(AppError::AlreadyCheckedIn { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_team_id_is_invalid() {
        let service = CheckInService::new(&stores(), UndoPolicy::MarkAbsent);
        assert!(matches!(service.check_in("   ").await, Err(AppError::InvalidInput)));
        assert!(matches!(service.check_in("").await, Err(AppError::InvalidInput)));
    }

    #[tokio::test]
    async fn test_unknown_team_does_not_mutate_stores() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);
        let before = stores.roster.list_all().await.unwrap();

        assert!(matches!(
            service.check_in("ZZZZ999").await,
            Err(AppError::NotFound)
        ));

        assert_eq!(stores.roster.list_all().await.unwrap(), before);
        assert!(stores.attendance.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_in_mirrors_into_attendance_log() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let view = service.check_in("h2").await.unwrap();

        let entry = stores.attendance.find("H2").await.unwrap().unwrap();
        assert_eq!(entry.team_name, "Beta");
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert_eq!(Some(entry.check_in_time), view.check_in_time);
    }

    #[tokio::test]
    async fn test_attendance_failure_does_not_fail_check_in() {
        let stores = Stores::new(
            Arc::new(InMemoryRoster::with_teams([team("H1", "Alpha")])),
            Arc::new(BrokenAttendanceLog),
        );
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let view = service.check_in("H1").await.unwrap();
        assert!(view.check_in_time.is_some());
        assert!(service.status("H1").await.unwrap().is_checked_in);

        // Undo also tolerates the broken log.
        service.undo_check_in("H1").await.unwrap();
        assert!(!service.status("H1").await.unwrap().is_checked_in);
    }

    #[tokio::test]
    async fn test_undo_then_check_in_again_moves_time_forward() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let first = service.check_in("H1").await.unwrap().check_in_time.unwrap();
        let undone = service.undo_check_in("h1").await.unwrap();
        assert!(undone.check_in_time.is_none());

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.check_in("H1").await.unwrap().check_in_time.unwrap();

        assert!(second > first);
        let entry = stores.attendance.find("H1").await.unwrap().unwrap();
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert_eq!(entry.check_in_time, second);
    }

    #[tokio::test]
    async fn test_undo_marks_entry_absent() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        service.check_in("H1").await.unwrap();
        service.undo_check_in("H1").await.unwrap();

        let entry = stores.attendance.find("H1").await.unwrap().unwrap();
        assert_eq!(entry.status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn test_undo_with_delete_policy_removes_entry() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::Delete);

        service.check_in("H1").await.unwrap();
        service.undo_check_in("H1").await.unwrap();

        assert!(stores.attendance.find("H1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undo_requires_checked_in_team() {
        let service = CheckInService::new(&stores(), UndoPolicy::MarkAbsent);

        assert!(matches!(
            service.undo_check_in("H1").await,
            Err(AppError::NotCheckedIn)
        ));
        assert!(matches!(
            service.undo_check_in("UNKNOWN").await,
            Err(AppError::NotCheckedIn)
        ));
    }

    #[tokio::test]
    async fn test_manual_check_in_shares_the_same_contract() {
        let service = CheckInService::new(&stores(), UndoPolicy::MarkAbsent);

        service.manual_check_in("h2").await.unwrap();
        assert!(matches!(
            service.check_in("H2").await,
            Err(AppError::AlreadyCheckedIn { .. })
        ));
        assert!(matches!(
            service.manual_check_in("nope").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_check_ins_yield_exactly_one_success() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let service = service.clone();
                let raw = if i % 2 == 0 { "H1" } else { " h1" };
                tokio::spawn(async move { service.check_in(raw).await })
            })
            .collect();

        let mut successes = 0;
        let mut rejections = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::AlreadyCheckedIn { .. }) => rejections += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(rejections, 31);
        assert_eq!(stores.attendance.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_records_stay_consistent_at_rest() {
        let stores = stores();
        let service = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        service.check_in("H1").await.unwrap();
        service.check_in("H2").await.unwrap();
        service.undo_check_in("H2").await.unwrap();
        let _ = service.check_in("H1").await;

        for team in stores.roster.list_all().await.unwrap() {
            assert!(team.is_consistent(), "inconsistent record: {:?}", team);
        }
    }
}

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use crate::database::{
    AttendanceLog, RosterStore, Stores,
    models::{CheckInStats, TeamRecord},
};
use crate::error::AppError;
use crate::services::export;

/// A rendered spreadsheet ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read side of the admin dashboard.
#[derive(Clone)]
pub struct ReportService {
    roster: Arc<dyn RosterStore>,
    attendance: Arc<dyn AttendanceLog>,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(stores: &Stores, export_utc_offset_minutes: i32) -> Self {
        let offset = export_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                log::warn!(
                    "Export offset of {} minutes is out of range, using UTC",
                    export_utc_offset_minutes
                );
                Utc.fix()
            });

        Self {
            roster: Arc::clone(&stores.roster),
            attendance: Arc::clone(&stores.attendance),
            offset,
        }
    }

    pub async fn stats(&self) -> Result<CheckInStats, AppError> {
        Ok(self.roster.stats().await?)
    }

    /// All teams in dashboard order, optionally narrowed by a search term.
    pub async fn list_teams(&self, search: Option<&str>) -> Result<Vec<TeamRecord>, AppError> {
        let teams = self.roster.list_all().await?;

        Ok(match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => teams
                .into_iter()
                .filter(|team| team.matches_search(needle))
                .collect(),
            None => teams,
        })
    }

    pub async fn export(&self) -> Result<ExportFile, AppError> {
        let entries = self.attendance.list().await?;
        if !entries.iter().any(|entry| entry.is_present()) {
            return Err(AppError::NoData);
        }

        let bytes = export::attendance_workbook(&entries, self.offset).map_err(|e| {
            log::error!("Error building export workbook: {}", e);
            AppError::internal_server_error_message("Failed to export data")
        })?;

        log::info!("Exported {} attendance entries", entries.len());
        Ok(ExportFile {
            filename: export::export_filename(Utc::now(), self.offset),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UndoPolicy;
    use crate::database::memory::{InMemoryAttendanceLog, InMemoryRoster};
    use crate::database::models::TeamInput;
    use crate::services::checkin::CheckInService;
    use pretty_assertions::assert_eq;

    fn team(id: &str, name: &str) -> TeamInput {
        TeamInput {
            team_id: id.to_string(),
            team_name: name.to_string(),
            college: "Malnad College of Engineering".to_string(),
            members: vec![],
            contact_number: String::new(),
            email: String::new(),
        }
    }

    fn stores() -> Stores {
        Stores::new(
            Arc::new(InMemoryRoster::with_teams([
                team("H1", "Byte Busters"),
                team("H2", "Null Pointers"),
                team("H3", "Async Avengers"),
            ])),
            Arc::new(InMemoryAttendanceLog::new()),
        )
    }

    #[tokio::test]
    async fn test_stats_move_by_one_per_check_in() {
        let stores = stores();
        let reports = ReportService::new(&stores, 330);
        let checkin = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        assert_eq!(reports.stats().await.unwrap(), CheckInStats::from_counts(3, 0));

        checkin.check_in("H2").await.unwrap();
        let stats = reports.stats().await.unwrap();
        assert_eq!(stats.checked_in, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total, stats.checked_in + stats.pending);

        checkin.undo_check_in("H2").await.unwrap();
        assert_eq!(reports.stats().await.unwrap().checked_in, 0);
    }

    #[tokio::test]
    async fn test_list_puts_recent_check_ins_first() {
        let stores = stores();
        let reports = ReportService::new(&stores, 330);
        let checkin = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        checkin.check_in("H3").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        checkin.check_in("H2").await.unwrap();

        let ids: Vec<String> = reports
            .list_teams(None)
            .await
            .unwrap()
            .into_iter()
            .map(|team| team.team_id)
            .collect();
        assert_eq!(ids, vec!["H2", "H3", "H1"]);
    }

    #[tokio::test]
    async fn test_search_matches_id_or_name() {
        let reports = ReportService::new(&stores(), 330);

        let by_name = reports.list_teams(Some("pointers")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].team_id, "H2");

        let by_id = reports.list_teams(Some("h3")).await.unwrap();
        assert_eq!(by_id.len(), 1);

        assert_eq!(reports.list_teams(Some("  ")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_export_without_present_entries_is_no_data() {
        let stores = stores();
        let reports = ReportService::new(&stores, 330);
        let checkin = CheckInService::new(&stores, UndoPolicy::MarkAbsent);

        assert!(matches!(reports.export().await, Err(AppError::NoData)));

        // An absent-only log still has nothing to export.
        checkin.check_in("H1").await.unwrap();
        checkin.undo_check_in("H1").await.unwrap();
        assert!(matches!(reports.export().await, Err(AppError::NoData)));
    }

    #[tokio::test]
    async fn test_export_produces_named_workbook() {
        let stores = stores();
        let reports = ReportService::new(&stores, 330);
        CheckInService::new(&stores, UndoPolicy::MarkAbsent)
            .check_in("H1")
            .await
            .unwrap();

        let file = reports.export().await.unwrap();
        assert!(file.filename.starts_with("Checked_In_Teams_"));
        assert!(file.filename.ends_with(".xlsx"));
        assert!(file.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let reports = ReportService::new(&Stores::in_memory(), 100_000);
        assert_eq!(reports.offset, Utc.fix());

        // Too large to convert to seconds at all.
        let reports = ReportService::new(&Stores::in_memory(), 40_000_000);
        assert_eq!(reports.offset, Utc.fix());

        let reports = ReportService::new(&Stores::in_memory(), i32::MIN);
        assert_eq!(reports.offset, Utc.fix());
    }
}

//! In-memory store implementations for tests and local runs.
//!
//! Each conditional transition runs under a single write lock, which gives the
//! same all-or-nothing behaviour as the Postgres `UPDATE ... WHERE` statement.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::error::{StoreError, StoreResult};
use crate::database::models::{
    AttendanceEntry, AttendanceInput, AttendanceStatus, CheckInOutcome, CheckInStats, TeamInput,
    TeamRecord, dashboard_order,
};
use crate::database::store::{AttendanceLog, RosterStore};

/// In-memory roster keyed by normalized team id.
pub struct InMemoryRoster {
    teams: RwLock<BTreeMap<String, TeamRecord>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self {
            teams: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create pre-seeded with pending teams.
    pub fn with_teams(inputs: impl IntoIterator<Item = TeamInput>) -> Self {
        let now = Utc::now();
        let teams = inputs
            .into_iter()
            .map(|input| (input.team_id.clone(), TeamRecord::from_input(input, now)))
            .collect();
        Self {
            teams: RwLock::new(teams),
        }
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for InMemoryRoster {
    async fn try_check_in(&self, team_id: &str, at: DateTime<Utc>) -> StoreResult<CheckInOutcome> {
        let mut teams = self.teams.write().map_err(|_| StoreError::LockPoisoned)?;

        let Some(team) = teams.get_mut(team_id) else {
            return Ok(CheckInOutcome::NotFound);
        };
        if team.is_checked_in {
            return Ok(CheckInOutcome::AlreadyCheckedIn(team.clone()));
        }

        team.is_checked_in = true;
        team.check_in_time = Some(at);
        team.updated_at = Utc::now();
        Ok(CheckInOutcome::CheckedIn(team.clone()))
    }

    async fn try_undo_check_in(&self, team_id: &str) -> StoreResult<Option<TeamRecord>> {
        let mut teams = self.teams.write().map_err(|_| StoreError::LockPoisoned)?;

        match teams.get_mut(team_id) {
            Some(team) if team.is_checked_in => {
                team.is_checked_in = false;
                team.check_in_time = None;
                team.updated_at = Utc::now();
                Ok(Some(team.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_team_id(&self, team_id: &str) -> StoreResult<Option<TeamRecord>> {
        let teams = self.teams.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(teams.get(team_id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<TeamRecord>> {
        let teams = self.teams.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<TeamRecord> = teams.values().cloned().collect();
        all.sort_by(dashboard_order);
        Ok(all)
    }

    async fn stats(&self) -> StoreResult<CheckInStats> {
        let teams = self.teams.read().map_err(|_| StoreError::LockPoisoned)?;
        let checked_in = teams.values().filter(|t| t.is_checked_in).count() as i64;
        Ok(CheckInStats::from_counts(teams.len() as i64, checked_in))
    }

    async fn insert_team(&self, input: TeamInput) -> StoreResult<TeamRecord> {
        let mut teams = self.teams.write().map_err(|_| StoreError::LockPoisoned)?;

        if teams.contains_key(&input.team_id) {
            return Err(StoreError::Duplicate(input.team_id));
        }

        let record = TeamRecord::from_input(input, Utc::now());
        teams.insert(record.team_id.clone(), record.clone());
        Ok(record)
    }

    async fn clear(&self) -> StoreResult<u64> {
        let mut teams = self.teams.write().map_err(|_| StoreError::LockPoisoned)?;
        let removed = teams.len() as u64;
        teams.clear();
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.teams
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::LockPoisoned)
    }
}

/// In-memory attendance log keyed by team id.
pub struct InMemoryAttendanceLog {
    entries: RwLock<BTreeMap<String, AttendanceEntry>>,
}

impl InMemoryAttendanceLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryAttendanceLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttendanceLog for InMemoryAttendanceLog {
    async fn record_present(&self, input: AttendanceInput) -> StoreResult<AttendanceEntry> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let now = Utc::now();

        let entry = entries
            .entry(input.team_id.clone())
            .and_modify(|existing| {
                existing.team_name = input.team_name.clone();
                existing.check_in_time = input.check_in_time;
                existing.status = AttendanceStatus::Present;
                existing.updated_at = now;
            })
            .or_insert_with(|| AttendanceEntry {
                team_id: input.team_id.clone(),
                team_name: input.team_name.clone(),
                check_in_time: input.check_in_time,
                status: AttendanceStatus::Present,
                created_at: now,
                updated_at: now,
            });

        Ok(entry.clone())
    }

    async fn mark_absent(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;

        Ok(entries.get_mut(team_id).map(|entry| {
            entry.status = AttendanceStatus::Absent;
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn remove(&self, team_id: &str) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(team_id).is_some())
    }

    async fn find(&self, team_id: &str) -> StoreResult<Option<AttendanceEntry>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(team_id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<AttendanceEntry>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<AttendanceEntry> = entries.values().cloned().collect();
        all.sort_by(|a, b| {
            a.check_in_time
                .cmp(&b.check_in_time)
                .then_with(|| a.team_id.cmp(&b.team_id))
        });
        Ok(all)
    }
}

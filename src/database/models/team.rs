use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLLEGE: &str = "Malnad College of Engineering";
pub const MAX_MEMBERS: usize = 4;

/// Canonical form of a team identifier: trimmed and upper-cased.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_team_id(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// A roster row. One per selected team, seeded before the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team_id: String,
    pub team_name: String,
    pub college: String,
    pub members: Vec<String>,
    pub contact_number: String,
    pub email: String,
    pub is_checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>, // TIMESTAMPTZ, NULL while pending
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamRecord {
    pub fn from_input(input: TeamInput, now: DateTime<Utc>) -> Self {
        Self {
            team_id: input.team_id,
            team_name: input.team_name,
            college: input.college,
            members: input.members,
            contact_number: input.contact_number,
            email: input.email,
            is_checked_in: false,
            check_in_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `is_checked_in` and `check_in_time` must always agree.
    pub fn is_consistent(&self) -> bool {
        self.is_checked_in == self.check_in_time.is_some()
    }

    /// Case-insensitive substring match on id or name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.team_id.to_lowercase().contains(&needle)
            || self.team_name.to_lowercase().contains(&needle)
    }
}

/// Dashboard ordering: checked-in first, most recent check-in first, then by id.
pub fn dashboard_order(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.is_checked_in
        .cmp(&a.is_checked_in)
        .then_with(|| b.check_in_time.cmp(&a.check_in_time))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInput {
    pub team_id: String,
    pub team_name: String,
    pub college: String,
    pub members: Vec<String>,
    pub contact_number: String,
    pub email: String,
}

/// What a team (or the check-in desk) gets to see after a check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub team_id: String,
    pub team_name: String,
    pub college: String,
    pub members: Vec<String>,
    pub check_in_time: Option<DateTime<Utc>>,
}

impl From<TeamRecord> for TeamView {
    fn from(team: TeamRecord) -> Self {
        Self {
            team_id: team.team_id,
            team_name: team.team_name,
            college: team.college,
            members: team.members,
            check_in_time: team.check_in_time,
        }
    }
}

/// Result of the conditional pending -> checked-in transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    /// The update applied; carries the record as written.
    CheckedIn(TeamRecord),
    /// A record with that id exists but was not pending.
    AlreadyCheckedIn(TeamRecord),
    NotFound,
}

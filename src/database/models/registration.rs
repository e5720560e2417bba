use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

/// A row of the attendance log (`registrations_done`).
///
/// Written after a successful roster transition; used for history and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub team_id: String,
    pub team_name: String,
    pub check_in_time: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceInput {
    pub team_id: String,
    pub team_name: String,
    pub check_in_time: DateTime<Utc>,
}

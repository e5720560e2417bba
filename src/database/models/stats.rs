use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInStats {
    pub total: i64,
    pub checked_in: i64,
    pub pending: i64,
}

impl CheckInStats {
    pub fn from_counts(total: i64, checked_in: i64) -> Self {
        Self {
            total,
            checked_in,
            pending: total - checked_in,
        }
    }
}

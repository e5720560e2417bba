use thiserror::Error;

/// Failures reported by the roster and attendance backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Team {0} already exists")]
    Duplicate(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Maps a unique-key violation to `Duplicate`, everything else to `Database`.
    pub fn from_insert(error: sqlx::Error, team_id: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(team_id.to_string())
            }
            _ => StoreError::Database(error),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

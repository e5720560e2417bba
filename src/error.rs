use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::database::StoreError;
use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Team ID is required")]
    InvalidInput,

    #[error("Team ID not found. Please verify your Team ID.")]
    NotFound,

    #[error("This team has already checked in.")]
    AlreadyCheckedIn {
        team_id: String,
        team_name: String,
        check_in_time: Option<DateTime<Utc>>,
    },

    #[error("Team is not checked in")]
    NotCheckedIn,

    #[error("Database error. Please try again.")]
    StoreUnavailable(#[source] StoreError),

    #[error("No checked-in teams to export")]
    NoData,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

/// Shown next to the "already checked in" message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckedInTeam<'a> {
    team_id: &'a str,
    team_name: &'a str,
    check_in_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct AlreadyCheckedInBody<'a> {
    team: CheckedInTeam<'a>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyCheckedIn { .. } => StatusCode::BAD_REQUEST,
            AppError::NotCheckedIn => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoData => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!(
                "Request failed with status {}: {}",
                status_code,
                self.log_detail()
            );
        } else {
            log::debug!("Request rejected with status {}: {}", status_code, error_message);
        }

        match self {
            AppError::AlreadyCheckedIn {
                team_id,
                team_name,
                check_in_time,
            } => HttpResponse::build(status_code).json(ApiResponse::error_with_data(
                AlreadyCheckedInBody {
                    team: CheckedInTeam {
                        team_id,
                        team_name,
                        check_in_time: *check_in_time,
                    },
                },
                &error_message,
            )),
            _ => HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::StoreUnavailable(error)
    }
}

impl AppError {
    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    /// The client message plus the underlying store error, for server logs.
    fn log_detail(&self) -> String {
        match self {
            AppError::StoreUnavailable(source) => format!("{} ({})", self, source),
            _ => self.to_string(),
        }
    }
}

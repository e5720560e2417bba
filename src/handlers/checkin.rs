use actix_web::{HttpRequest, HttpResponse, Result, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::database::models::TeamView;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub team_id: Option<String>,
}

impl CheckInRequest {
    pub fn team_id(&self) -> Result<&str, AppError> {
        self.team_id.as_deref().ok_or(AppError::InvalidInput)
    }
}

#[derive(Debug, Serialize)]
pub struct TeamPayload {
    pub team: TeamView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub is_checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub team_name: String,
}

/// Self-service check-in
pub async fn check_in(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AppError> {
    let correlation_id = req.correlation_id();
    let team = state
        .checkin
        .check_in(payload.team_id()?)
        .await
        .inspect_err(|e| log::info!("Check-in request {} rejected: {}", correlation_id, e))?;
    log::info!("Check-in request {} accepted for {}", correlation_id, team.team_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        TeamPayload { team },
        "Check-in successful! Welcome to the event.",
    )))
}

/// Check-in status lookup
pub async fn check_in_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let team = state.checkin.status(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(StatusPayload {
        is_checked_in: team.is_checked_in,
        check_in_time: team.check_in_time,
        team_name: team.team_name,
    })))
}

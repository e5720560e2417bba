use actix_web::{
    HttpRequest, HttpResponse, Result,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::database::models::{CheckInStats, TeamRecord};
use crate::error::AppError;
use crate::handlers::checkin::{CheckInRequest, TeamPayload};
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;
use crate::services::export;

#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: CheckInStats,
}

#[derive(Debug, Serialize)]
pub struct TeamsPayload {
    pub teams: Vec<TeamRecord>,
}

/// Dashboard counters
pub async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = state.reports.stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(StatsPayload { stats })))
}

/// Every team in dashboard order, `?search=` narrows by id or name
pub async fn get_all_teams(
    state: web::Data<AppState>,
    query: web::Query<TeamsQuery>,
) -> Result<HttpResponse, AppError> {
    let teams = state.reports.list_teams(query.search.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(TeamsPayload { teams })))
}

pub async fn manual_check_in(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AppError> {
    let correlation_id = req.correlation_id();
    let team = state
        .checkin
        .manual_check_in(payload.team_id()?)
        .await
        .inspect_err(|e| log::info!("Manual check-in {} rejected: {}", correlation_id, e))?;
    log::info!("Manual check-in {} accepted for {}", correlation_id, team.team_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        TeamPayload { team },
        "Team checked in manually",
    )))
}

pub async fn undo_check_in(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let correlation_id = req.correlation_id();
    let team = state
        .checkin
        .undo_check_in(&path.into_inner())
        .await
        .inspect_err(|e| log::info!("Undo {} rejected: {}", correlation_id, e))?;
    log::info!("Undo {} applied for {}", correlation_id, team.team_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        TeamPayload { team },
        "Check-in undone",
    )))
}

/// Attendance spreadsheet download
pub async fn export_checked_in(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let file = state.reports.export().await?;

    Ok(HttpResponse::Ok()
        .content_type(export::CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.filename)],
        })
        .body(file.bytes))
}

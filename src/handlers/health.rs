use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;

use crate::AppState;
use crate::handlers::shared::ApiResponse;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

async fn store_reachable(state: &AppState) -> bool {
    match tokio::time::timeout(PING_TIMEOUT, state.stores.roster.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!("Store ping failed: {}", e);
            false
        }
        Err(_) => {
            log::warn!("Store ping timed out after {:?}", PING_TIMEOUT);
            false
        }
    }
}

fn backend(state: &AppState) -> &'static str {
    if state.config.uses_memory_store() {
        "memory"
    } else {
        "postgres"
    }
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the event check-in API",
        "availableEndpoints": ["/api/checkin", "/api/admin", "/api/health"]
    }))
}

/// Liveness. Always 200; the store status is informational.
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let status = if store_reachable(&state).await {
        "connected"
    } else {
        "disconnected"
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "Check-in backend is running",
        "timestamp": chrono::Utc::now(),
        "database": {
            "status": status,
            "backend": backend(&state),
        }
    }))
}

/// Readiness. 503 until the store answers.
pub async fn readiness(state: web::Data<AppState>) -> impl Responder {
    if store_reachable(&state).await {
        HttpResponse::Ok().json(json!({ "success": true, "status": "ready" }))
    } else {
        HttpResponse::ServiceUnavailable().json(ApiResponse::<()>::error("Database unavailable"))
    }
}

pub async fn not_found(req: HttpRequest) -> impl Responder {
    let path = req.path();
    if path.starts_with("/api") {
        HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Endpoint not found",
            "path": path,
        }))
    } else {
        HttpResponse::NotFound().json(ApiResponse::<()>::error("Not found"))
    }
}

use std::sync::Arc;

use actix_web::{http::StatusCode, test};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use checkin::database::memory::InMemoryAttendanceLog;
use checkin::database::models::{CheckInOutcome, CheckInStats, TeamInput, TeamRecord};
use checkin::database::{RosterStore, StoreError, StoreResult};
use checkin::{Config, Stores, create_app};

mod common;
use common::{TestContext, json_body};

/// A roster whose backend is gone.
struct UnreachableRoster;

#[async_trait]
impl RosterStore for UnreachableRoster {
    async fn try_check_in(&self, _team_id: &str, _at: DateTime<Utc>) -> StoreResult<CheckInOutcome> {
        Err(StoreError::LockPoisoned)
    }

    async fn try_undo_check_in(&self, _team_id: &str) -> StoreResult<Option<TeamRecord>> {
        Err(StoreError::LockPoisoned)
    }

    async fn find_by_team_id(&self, _team_id: &str) -> StoreResult<Option<TeamRecord>> {
        Err(StoreError::LockPoisoned)
    }

    async fn list_all(&self) -> StoreResult<Vec<TeamRecord>> {
        Err(StoreError::LockPoisoned)
    }

    async fn stats(&self) -> StoreResult<CheckInStats> {
        Err(StoreError::LockPoisoned)
    }

    async fn insert_team(&self, _input: TeamInput) -> StoreResult<TeamRecord> {
        Err(StoreError::LockPoisoned)
    }

    async fn clear(&self) -> StoreResult<u64> {
        Err(StoreError::LockPoisoned)
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(StoreError::LockPoisoned)
    }
}

fn unreachable_context() -> TestContext {
    TestContext::with_stores(
        Config::test_config(),
        Stores::new(
            Arc::new(UnreachableRoster),
            Arc::new(InMemoryAttendanceLog::new()),
        ),
    )
}

#[actix_web::test]
async fn test_index_lists_endpoints() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["availableEndpoints"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_health_reports_store_status() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "connected");
    assert_eq!(body["database"]["backend"], "memory");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_health_stays_up_without_store() {
    let ctx = unreachable_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["database"]["status"], "disconnected");
}

#[actix_web::test]
async fn test_readiness() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/health/ready").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let ctx = unreachable_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_store_failure_is_reported_generically() {
    let ctx = unreachable_context();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/checkin")
        .set_json(serde_json::json!({ "teamId": "H1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Database error. Please try again.");
}

#[actix_web::test]
async fn test_unknown_route() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Endpoint not found");
    assert_eq!(body["path"], "/api/nothing-here");

    let req = test::TestRequest::get().uri("/favicon.ico").to_request();
    let body = json_body(test::call_service(&app, req).await).await;
    assert_eq!(body["message"], "Not found");
}

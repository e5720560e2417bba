#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, web};
use fake::{
    Fake,
    faker::{company::en::CompanyName, name::en::Name},
};
use serde_json::Value;

use checkin::database::memory::{InMemoryAttendanceLog, InMemoryRoster};
use checkin::database::models::TeamInput;
use checkin::{AppState, Config, Stores};

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A pending team with generated members.
pub fn team(id: &str, name: &str) -> TeamInput {
    let member_count = (1..=4).fake::<usize>();
    TeamInput {
        team_id: id.to_string(),
        team_name: name.to_string(),
        college: CompanyName().fake(),
        members: (0..member_count).map(|_| Name().fake()).collect(),
        contact_number: "9876543210".to_string(),
        email: format!("{}@example.com", id.to_lowercase()),
    }
}

pub fn sample_teams() -> Vec<TeamInput> {
    vec![
        team("H1", "Byte Busters"),
        team("H2", "Null Pointers"),
        team("H3", "Async Avengers"),
    ]
}

pub struct TestContext {
    pub config: Config,
    pub stores: Stores,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let stores = Stores::new(
            Arc::new(InMemoryRoster::with_teams(sample_teams())),
            Arc::new(InMemoryAttendanceLog::new()),
        );
        Self::with_stores(config, stores)
    }

    pub fn with_stores(config: Config, stores: Stores) -> Self {
        setup_test_env();
        let state = web::Data::new(AppState::new(config.clone(), stores.clone()));
        Self {
            config,
            stores,
            state,
        }
    }
}

pub async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let body = actix_web::test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body is JSON")
}

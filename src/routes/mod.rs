use actix_web::{HttpResponse, error::InternalError, web};

use crate::handlers::shared::ApiResponse;

pub mod admin;
pub mod checkin;
pub mod health;

/// Mount every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .configure(health::configure)
            .configure(checkin::configure)
            .configure(admin::configure),
    );
}

/// Malformed JSON bodies become a 400 in the usual envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {}", err);
        log::debug!("{}", message);
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(&message)),
        )
        .into()
    })
}

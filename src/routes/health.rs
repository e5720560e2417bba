use actix_web::web;

use crate::handlers::health;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health::index))
        .route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health))
        .route("/health/ready", web::get().to(health::readiness));
}

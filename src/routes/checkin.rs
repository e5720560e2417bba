use actix_web::web;

use crate::handlers::checkin;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkin")
            .route("", web::post().to(checkin::check_in))
            .route("/status/{team_id}", web::get().to(checkin::check_in_status)),
    );
}

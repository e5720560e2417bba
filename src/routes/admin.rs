use actix_web::web;

use crate::handlers::admin;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats", web::get().to(admin::get_stats))
            .route("/all-teams", web::get().to(admin::get_all_teams))
            .route("/manual-checkin", web::post().to(admin::manual_check_in))
            .route(
                "/undo-checkin/{team_id}",
                web::delete().to(admin::undo_check_in),
            )
            .route("/export", web::get().to(admin::export_checked_in)),
    );
}

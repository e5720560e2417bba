use actix_web::{
    App, Error,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web,
};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
pub use database::Stores;
pub use error::AppError;
pub use services::{CheckInService, ReportService};

/// Shared by every worker through `web::Data`.
pub struct AppState {
    pub checkin: CheckInService,
    pub reports: ReportService,
    pub stores: Stores,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        Self {
            checkin: CheckInService::new(&stores, config.undo_policy),
            reports: ReportService::new(&stores, config.export_utc_offset_minutes),
            stores,
            config,
        }
    }
}

/// The application without transport concerns (CORS, access log), so tests
/// and `main` serve the same routes and request ids.
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .configure(routes::configure)
        .default_service(web::to(handlers::health::not_found))
        .wrap(middleware::RequestIdMiddleware)
}

use actix_cors::Cors;
use actix_web::{HttpServer, middleware::Logger, web};
use anyhow::Result;

use checkin::{AppState, Config, Stores, create_app};

fn cors(config: &Config) -> Cors {
    let cors = match &config.cors_allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Accept", "X-Correlation-ID"])
        .expose_headers(vec!["Content-Disposition", "X-Correlation-ID"])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting check-in API server...");

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (store: {}, undo policy: {:?})",
        if config.uses_memory_store() { "memory" } else { "postgres" },
        config.undo_policy
    );

    let stores = Stores::connect(&config).await?;
    log::info!("Store initialized");

    let server_address = config.server_address();
    let app_state = web::Data::new(AppState::new(config.clone(), stores));

    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        create_app(app_state.clone())
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .wrap(cors(&config))
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

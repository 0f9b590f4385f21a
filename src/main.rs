//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use workspace_billing_service::config::ServiceConfig;
use workspace_billing_service::services::usage_reporting::{
    spawn_usage_reporting, FileRecordCounter, LogUsageReporter,
};
use workspace_billing_service::utils::{AppState, WorkspaceStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServiceConfig::from_env().map_err(|e| {
        error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store = WorkspaceStore::new(config.storage_root.clone());
    store.ensure_storage()?;

    if config.usage_reporting_enabled() {
        info!("📊 Usage reporting every {} seconds", config.usage_report_interval_secs);
        spawn_usage_reporting(
            store.clone(),
            Arc::new(FileRecordCounter::new(store.clone())),
            Arc::new(LogUsageReporter),
            Duration::from_secs(config.usage_report_interval_secs),
        );
    }

    let state = web::Data::new(
        AppState::new(store, config.jwt_secret.clone())
            .with_billing_secret(config.billing_webhook_secret.clone()),
    );
    let cors_origin = config.cors_allowed_origin.clone();

    info!("Server started at {}", config.bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(workspace_billing_service::configure)
    })
        .bind(&config.bind_address)?
        .run()
        .await
}

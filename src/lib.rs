pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use actix_web::web;
use utils::Authentication;

// Register every route of the service. Billing routes carry their own
// credential; everything else needs a user session.
pub fn configure(cfg: &mut web::ServiceConfig) {
    routes::billing_routes::init_routes(cfg);
    cfg.service(
        web::scope("")
            .wrap(Authentication)
            .configure(routes::workspace_routes::init_routes)
            .configure(routes::app_routes::init_routes),
    );
}

// src/routes/mod.rs
pub mod app_routes;
pub mod billing_routes;
pub mod workspace_routes;

// workspace-billing-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod workspace;
pub use workspace::*;

pub mod usage;
pub use usage::*;

// JWT claims structure. Tokens come from the identity provider; this service
// only verifies them and re-issues one carrying the selected workspace.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
    #[serde(default)]
    pub active_workspace_id: Option<String>,
}

// Custom error types
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Forbidden")]
    Forbidden,
    // Workspace fields cannot answer the question being asked of them
    #[display(fmt = "Invalid state: {}", _0)]
    InvalidState(String),
    #[display(fmt = "Trial expired")]
    TrialExpired,
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::TrialExpired => StatusCode::PAYMENT_REQUIRED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError =>
                HttpResponse::InternalServerError().json("Internal Server Error"),
            ServiceError::BadRequest(ref message) =>
                HttpResponse::BadRequest().json(message),
            ServiceError::Unauthorized =>
                HttpResponse::Unauthorized().json("Unauthorized"),
            ServiceError::NotFound =>
                HttpResponse::NotFound().json("Not Found"),
            ServiceError::Forbidden =>
                HttpResponse::Forbidden().json("Forbidden: You don't have permission to access this resource"),
            ServiceError::InvalidState(ref message) =>
                HttpResponse::Conflict().json(json!({
                    "error": "invalid_state",
                    "message": message
                })),
            ServiceError::TrialExpired =>
                HttpResponse::PaymentRequired().json(json!({
                    "error": "trial_expired",
                    "message": "Your trial has ended. Upgrade your subscription to keep using the workspace."
                })),
        }
    }
}

// Authenticated application shell, mounted behind the trial gate
use crate::models::ServiceError;
use crate::services::trial_lifecycle::classify;
use crate::utils::{get_claims_from_request, AppState, TrialGate};
use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error};
use serde_json::json;

#[get("/session")]
async fn get_session(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let claims = get_claims_from_request(&req)?;

    let workspace_id = match claims.active_workspace_id {
        Some(workspace_id) => workspace_id,
        None => {
            return Err(ServiceError::BadRequest(
                "No active workspace selected".to_string(),
            ))
        }
    };

    debug!("👤 Loading session for user: {} in workspace: {}", claims.sub, workspace_id);

    let workspace = match state.store.find_workspace_by_id(&workspace_id)? {
        Some(workspace) if workspace.owner_id == claims.sub => workspace,
        Some(_) => return Err(ServiceError::Forbidden),
        None => {
            error!("❌ Active workspace not found: {}", workspace_id);
            return Err(ServiceError::NotFound);
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "user_id": claims.sub,
        "email": claims.email,
        "state": classify(&workspace, Utc::now()),
        "workspace": workspace
    })))
}

// Register the gated /app scope
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/app").wrap(TrialGate).service(get_session));
}

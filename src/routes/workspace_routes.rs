use crate::models::{CreateWorkspaceRequest, ServiceError, Workspace, WorkspaceAccess};
use crate::services::trial_lifecycle::{classify, is_in_trial, is_trial_expired};
use crate::utils::{get_claims_from_request, get_user_id_from_request, jwt, AppState};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info, warn};
use serde_json::json;

// Load a workspace the caller owns
fn load_owned_workspace(state: &AppState, user_id: &str, workspace_id: &str) -> Result<Workspace, ServiceError> {
    let workspace = match state.store.find_workspace_by_id(workspace_id)? {
        Some(workspace) => workspace,
        None => {
            error!("❌ Workspace not found: {}", workspace_id);
            return Err(ServiceError::NotFound);
        }
    };

    if workspace.owner_id != user_id {
        error!("❌ User: {} doesn't have access to workspace: {}", user_id, workspace_id);
        return Err(ServiceError::Forbidden);
    }

    Ok(workspace)
}

// Create a new workspace; its trial starts now
#[post("/workspaces")]
async fn create_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    data: web::Json<CreateWorkspaceRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let name = data.validated_name()?;

    info!("📝 Creating new workspace: {} for user: {}", name, user_id);

    let workspace = Workspace::new(name, user_id, Utc::now());
    state.store.save_workspace(&workspace)?;

    info!("✅ Workspace created: {} (trial ends {:?})", workspace.id, workspace.trial_end_date);

    Ok(HttpResponse::Created().json(workspace))
}

// Get all workspaces for the current user
#[get("/workspaces")]
async fn get_user_workspaces(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching workspaces for user: {}", user_id);

    let workspaces = state.store.get_workspaces_for_owner(&user_id)?;

    info!("✅ Found {} workspaces for user: {}", workspaces.len(), user_id);

    Ok(HttpResponse::Ok().json(workspaces))
}

#[get("/workspaces/{workspace_id}")]
async fn get_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();

    info!("🔍 Fetching workspace: {} for user: {}", workspace_id, user_id);

    let workspace = load_owned_workspace(&state, &user_id, &workspace_id)?;

    Ok(HttpResponse::Ok().json(workspace))
}

// Trial/subscription classification used by the frontend router
#[get("/workspaces/{workspace_id}/access")]
async fn get_workspace_access(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();

    let workspace = load_owned_workspace(&state, &user_id, &workspace_id)?;
    let now = Utc::now();

    let in_trial = match is_in_trial(&workspace, now) {
        Ok(in_trial) => Some(in_trial),
        Err(ServiceError::InvalidState(reason)) => {
            warn!("⚠️ Cannot tell whether workspace is in trial: {}", reason);
            None
        }
        Err(e) => return Err(e),
    };

    let access = WorkspaceAccess {
        workspace_id: workspace.id.clone(),
        state: classify(&workspace, now),
        is_in_trial: in_trial,
        is_trial_expired: is_trial_expired(&workspace, now),
        trial_end_date: workspace.trial_end_date,
    };

    info!("✅ Workspace {} access state: {:?}", workspace.id, access.state);

    Ok(HttpResponse::Ok().json(access))
}

// Switch the session's active workspace
#[post("/workspaces/{workspace_id}/activate")]
async fn activate_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let claims = get_claims_from_request(&req)?;
    let workspace_id = path.into_inner();

    info!("🔄 Activating workspace: {} for user: {}", workspace_id, claims.sub);

    load_owned_workspace(&state, &claims.sub, &workspace_id)?;
    let token = jwt::reissue_with_workspace(&claims, Some(workspace_id.clone()), &state.jwt_secret)?;

    info!("✅ Workspace activated: {} for user: {}", workspace_id, claims.sub);

    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(json!({
            "message": "Workspace activated successfully",
            "token": token,
            "workspace_id": workspace_id
        })))
}

// Register all workspace routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_workspace)
        .service(get_user_workspaces)
        .service(get_workspace)
        .service(get_workspace_access)
        .service(activate_workspace);
}

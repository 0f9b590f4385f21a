// Endpoints called by the billing provider, authenticated with the shared
// billing secret instead of a user session
use crate::models::{ServiceError, UpdateSubscriptionRequest};
use crate::utils::{verify_billing_request, AppState};
use actix_web::{put, web, HttpRequest, HttpResponse};
use log::info;

// Record the provider's subscription status for a workspace
#[put("/workspaces/{workspace_id}/subscription")]
async fn update_subscription(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse, ServiceError> {
    verify_billing_request(&req, &state)?;

    let workspace_id = path.into_inner();
    let status = data.validated_status()?;

    info!("💳 Billing update for workspace: {} to: {}", workspace_id, status);

    let workspace = state.store.update_subscription_status(&workspace_id, Some(status))?;

    Ok(HttpResponse::Ok().json(workspace))
}

// Register the /billing scope
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/billing").service(update_subscription));
}

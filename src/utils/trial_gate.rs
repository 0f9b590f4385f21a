// Blocks the authenticated application once the active workspace's trial is over
use crate::models::{Claims, ServiceError};
use crate::services::trial_lifecycle::is_trial_expired;
use crate::utils::AppState;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error as ActixError, HttpMessage, ResponseError,
};
use chrono::Utc;
use futures::future::{ok, Ready};
use log::{debug, error, info};
use std::future::Future;
use std::pin::Pin;

// Must run after Authentication so the claims are present
pub struct TrialGate;

impl<S, B> Transform<S, ServiceRequest> for TrialGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Transform = TrialGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(TrialGateMiddleware { service })
    }
}

pub struct TrialGateMiddleware<S> {
    service: S,
}

impl<S> TrialGateMiddleware<S> {
    fn check(req: &ServiceRequest) -> Result<(), ServiceError> {
        let workspace_id = match req
            .extensions()
            .get::<Claims>()
            .and_then(|claims| claims.active_workspace_id.clone())
        {
            Some(workspace_id) => workspace_id,
            None => return Ok(()),
        };

        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            error!("❌ Trial gate is mounted without application state");
            ServiceError::InternalServerError
        })?;

        let workspace = match state.store.find_workspace_by_id(&workspace_id)? {
            Some(workspace) => workspace,
            None => {
                debug!("Active workspace {} not found, leaving it to the handler", workspace_id);
                return Ok(());
            }
        };

        if is_trial_expired(&workspace, Utc::now()) {
            info!("⛔ Trial expired for workspace: {}", workspace.id);
            return Err(ServiceError::TrialExpired);
        }

        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for TrialGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match Self::check(&req) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                let response = req.into_response(err.error_response()).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

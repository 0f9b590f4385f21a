use crate::models::{Claims, ServiceError};
use actix_web::{HttpMessage, HttpRequest};
use log::error;

pub mod trial_gate;
pub mod workspace_storage;

pub use trial_gate::TrialGate;
pub use workspace_storage::WorkspaceStore;

// Shared state handed to every handler through web::Data
pub struct AppState {
    pub store: WorkspaceStore,
    pub jwt_secret: String,
    pub billing_webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(store: WorkspaceStore, jwt_secret: String) -> Self {
        Self {
            store,
            jwt_secret,
            billing_webhook_secret: None,
        }
    }

    pub fn with_billing_secret(mut self, secret: Option<String>) -> Self {
        self.billing_webhook_secret = secret;
        self
    }
}

// Header the billing provider sends with every subscription update
pub const BILLING_SECRET_HEADER: &str = "X-Billing-Secret";

// Checks the billing provider's shared secret; user tokens are never accepted here
pub fn verify_billing_request(req: &HttpRequest, state: &AppState) -> Result<(), ServiceError> {
    let expected = match state.billing_webhook_secret.as_deref() {
        Some(secret) => secret,
        None => {
            error!("❌ Billing request received but no billing secret is configured");
            return Err(ServiceError::Unauthorized);
        }
    };

    let provided = req
        .headers()
        .get(BILLING_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !secrets_match(provided, expected) {
        error!("❌ Billing request to {} failed secret check", req.path());
        return Err(ServiceError::Unauthorized);
    }

    Ok(())
}

fn secrets_match(provided: &str, expected: &str) -> bool {
    use subtle::ConstantTimeEq;

    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

// Claims inserted by the authentication middleware
pub fn get_claims_from_request(req: &HttpRequest) -> Result<Claims, ServiceError> {
    match req.extensions().get::<Claims>() {
        Some(claims) => Ok(claims.clone()),
        None => {
            error!("❌ No verified claims on request to {}", req.path());
            Err(ServiceError::Unauthorized)
        }
    }
}

pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    get_claims_from_request(req).map(|claims| claims.sub)
}

// JWT utility functions
pub mod jwt {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

    // Sign a set of claims with the shared secret
    pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, ServiceError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
            .map_err(|e| {
                error!("❌ Failed to sign token: {:?}", e);
                ServiceError::InternalServerError
            })
    }

    // Same identity and expiry, with a different active workspace
    pub fn reissue_with_workspace(
        claims: &Claims,
        workspace_id: Option<String>,
        secret: &str,
    ) -> Result<String, ServiceError> {
        let claims = Claims {
            sub: claims.sub.clone(),
            email: claims.email.clone(),
            exp: claims.exp,
            iat: Utc::now().timestamp() as usize,
            active_workspace_id: workspace_id,
        };

        encode_token(&claims, secret)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ServiceError::Unauthorized),
        }
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::body::EitherBody;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::header;
    use actix_web::{Error, ResponseError};
    use actix_web::web;
    use futures::future::{ok, Ready};
    use log::debug;
    use std::future::Future;
    use std::pin::Pin;

    // Verifies bearer tokens with the secret held in AppState
    pub struct Authentication;

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware { service })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let secret = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.jwt_secret.clone(),
                None => {
                    error!("❌ Authentication is mounted without application state");
                    let response = req
                        .into_response(ServiceError::InternalServerError.error_response())
                        .map_into_right_body();
                    return Box::pin(async move { Ok(response) });
                }
            };

            let claims = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|auth_str| jwt::extract_token_from_header(auth_str).ok())
                .and_then(|token| jwt::decode_token(&token, &secret).ok());

            match claims {
                Some(claims) => {
                    // Add the claims to the request extensions
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
                }
                None => {
                    debug!("🔒 Rejecting unauthenticated request to {}", req.path());
                    let response = req
                        .into_response(ServiceError::Unauthorized.error_response())
                        .map_into_right_body();
                    Box::pin(async move { Ok(response) })
                }
            }
        }
    }
}

pub use auth_middleware::Authentication;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn state_with_secret(secret: Option<&str>) -> AppState {
        AppState::new(WorkspaceStore::new("./unused"), "jwt".to_string())
            .with_billing_secret(secret.map(|s| s.to_string()))
    }

    #[test]
    fn test_billing_request_needs_matching_secret() {
        let state = state_with_secret(Some("whsec_123"));

        let ok_req = TestRequest::default()
            .insert_header((BILLING_SECRET_HEADER, "whsec_123"))
            .to_http_request();
        assert!(verify_billing_request(&ok_req, &state).is_ok());

        let wrong_req = TestRequest::default()
            .insert_header((BILLING_SECRET_HEADER, "whsec_124"))
            .to_http_request();
        assert!(matches!(verify_billing_request(&wrong_req, &state), Err(ServiceError::Unauthorized)));

        let bearer_req = TestRequest::default()
            .insert_header(("Authorization", "Bearer whsec_123"))
            .to_http_request();
        assert!(matches!(verify_billing_request(&bearer_req, &state), Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn test_billing_request_rejected_without_configured_secret() {
        let state = state_with_secret(None);
        let req = TestRequest::default()
            .insert_header((BILLING_SECRET_HEADER, ""))
            .to_http_request();

        assert!(matches!(verify_billing_request(&req, &state), Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(jwt::extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(jwt::extract_token_from_header("Basic abc").is_err());
        assert!(jwt::extract_token_from_header("Bearer ").is_err());
    }
}

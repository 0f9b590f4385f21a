use crate::configure;
use crate::models::{Claims, Workspace};
use crate::utils::{jwt, AppState, WorkspaceStore};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use std::fs;

const SECRET: &str = "gate_secret";

fn temp_store() -> WorkspaceStore {
    WorkspaceStore::new(std::env::temp_dir().join(format!("trial-gate-{}", uuid::Uuid::new_v4())))
}

fn session_request(user_id: &str, active_workspace_id: Option<&str>) -> test::TestRequest {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        exp: (now + Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
        active_workspace_id: active_workspace_id.map(|id| id.to_string()),
    };
    let token = jwt::encode_token(&claims, SECRET).unwrap();

    test::TestRequest::get()
        .uri("/app/session")
        .insert_header(("Authorization", format!("Bearer {}", token)))
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($store.clone(), SECRET.to_string())))
                .configure(configure),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_gate_passes_request_without_active_workspace() {
    let store = temp_store();
    let app = init_app!(store);

    // Reaches the handler, which asks for a workspace to be selected
    let resp = test::call_service(&app, session_request("user-1", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_gate_passes_unknown_workspace_to_handler() {
    let store = temp_store();
    let app = init_app!(store);

    let resp = test::call_service(&app, session_request("user-1", Some("no-such-workspace")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_gate_reports_storage_failure() {
    let store = temp_store();
    store.ensure_storage().unwrap();
    fs::write(store.workspaces_dir().join("corrupt-ws.json"), "{ this is not json").unwrap();
    let app = init_app!(store);

    let resp = test::call_service(&app, session_request("user-1", Some("corrupt-ws")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    fs::remove_dir_all(store.root()).unwrap();
}

#[actix_rt::test]
async fn test_gate_lets_workspace_without_trial_end_date_through() {
    let store = temp_store();
    let mut workspace = Workspace::new("Legacy".to_string(), "user-1".to_string(), Utc::now() - Duration::days(90));
    workspace.trial_end_date = None;
    store.save_workspace(&workspace).unwrap();
    let app = init_app!(store);

    let resp = test::call_service(&app, session_request("user-1", Some(&workspace.id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["state"], "unknown");

    fs::remove_dir_all(store.root()).unwrap();
}

#[actix_rt::test]
async fn test_gate_blocks_expired_workspace() {
    let store = temp_store();
    let workspace = Workspace::new("Old".to_string(), "user-1".to_string(), Utc::now() - Duration::days(8));
    store.save_workspace(&workspace).unwrap();
    let app = init_app!(store);

    let resp = test::call_service(&app, session_request("user-1", Some(&workspace.id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);

    fs::remove_dir_all(store.root()).unwrap();
}

//! End-to-end session auth tests over an in-memory store
//!
//! Drives the real accounts router through `tower::ServiceExt::oneshot`,
//! with an extra expert-gated route standing in for knowledge-base
//! mutation endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use agrisense_accounts::{AccountsState, MemoryAuditLog};
use agrisense_auth::{
    ensure_root_admin, AuthConfig, ElevatedUser, MemoryUserStore, NewUser, Plan,
    RevalidateAgainstStore, Role, SessionAuth, SessionPayload, UserStore,
};
use agrisense_common::hash_password;

const COOKIE_NAME: &str = "agrisense-session";

/// Expert-gated probe route
async fn knowledge_base_probe(ElevatedUser(user): ElevatedUser) -> Json<Value> {
    Json(json!({ "editor": user.id }))
}

struct TestApp {
    router: Router,
    store: Arc<MemoryUserStore>,
    audit: Arc<MemoryAuditLog>,
    auth: SessionAuth,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let audit = Arc::new(MemoryAuditLog::new());

        let resolver = Arc::new(RevalidateAgainstStore::new(
            store.clone() as Arc<dyn agrisense_auth::UserStore>
        ));
        let auth = SessionAuth::new(
            AuthConfig::for_tests("integration-secret"),
            store.clone(),
            resolver,
        );

        ensure_root_admin(store.as_ref(), &auth.config().root_admin)
            .await
            .unwrap();

        let state = AccountsState {
            auth: auth.clone(),
            store: store.clone(),
            audit: audit.clone(),
        };

        let router = Router::new()
            .route(
                "/api/experts/knowledge",
                get(knowledge_base_probe).with_state(state.clone()),
            )
            .merge(agrisense_accounts::routes(state));

        Self {
            router,
            store,
            audit,
            auth,
        }
    }

    async fn seed_user(&self, email: &str, password: &str, role: Role) -> String {
        self.store
            .create(NewUser {
                email: email.to_string(),
                name: Some("Seeded User".to_string()),
                organization: None,
                password_hash: hash_password(password),
                role,
                plan: Plan::Free,
                avatar_url: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let session_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body, session_cookie)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap();

        let (status, _, cookie) = self.request(request).await;
        assert_eq!(status, StatusCode::OK, "login should succeed for {email}");
        cookie.expect("login response must set the session cookie")
    }

    async fn get_knowledge_with_cookie(&self, cookie: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri("/api/experts/knowledge")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let (status, body, _) = self.request(request).await;
        (status, body)
    }

    async fn patch_role(&self, admin_cookie: &str, user_id: &str, role: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/api/admin/users/{user_id}/role"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, admin_cookie)
            .body(Body::from(json!({ "role": role }).to_string()))
            .unwrap();
        let (status, body, _) = self.request(request).await;
        (status, body)
    }
}

#[tokio::test]
async fn test_login_gate_promote_then_access() {
    let app = TestApp::new().await;
    let farmer_id = app.seed_user("farmer@field.test", "plow-the-field", Role::Farmer).await;

    // Farmer logs in and receives a session cookie
    let farmer_cookie = app.login("farmer@field.test", "plow-the-field").await;

    // Expert-only endpoint rejects the farmer with 403
    let (status, body) = app.get_knowledge_with_cookie(&farmer_cookie).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Permission denied");

    // Root admin promotes the farmer to expert
    let admin_cookie = app.login("root@agrisense.test", "RootPassword1").await;
    let (status, body) = app.patch_role(&admin_cookie, &farmer_id, "expert").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "expert");

    // The original, un-reissued cookie now passes the guard
    let (status, body) = app.get_knowledge_with_cookie(&farmer_cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["editor"], farmer_id);

    // farmer -> expert is neither promotion nor demotion
    let entries = app.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "role.update");
    assert_eq!(entries[0].target.id, farmer_id);
}

#[tokio::test]
async fn test_unauthenticated_request_is_401() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/experts/knowledge")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Unauthorized");
}

#[tokio::test]
async fn test_bearer_token_wins_over_cookie() {
    let app = TestApp::new().await;
    let expert_a = app.seed_user("a@experts.test", "password-a", Role::Expert).await;
    app.seed_user("b@experts.test", "password-b", Role::Expert).await;

    let cookie_b = app.login("b@experts.test", "password-b").await;
    let token_a = app
        .auth
        .codec()
        .sign(&SessionPayload::new(
            expert_a.clone(),
            "a@experts.test",
            Role::Expert,
        ))
        .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/experts/knowledge")
        .header(header::AUTHORIZATION, format!("Bearer {token_a}"))
        .header(header::COOKIE, cookie_b)
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.request(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["editor"], expert_a);
}

#[tokio::test]
async fn test_root_admin_demotion_is_blocked() {
    let app = TestApp::new().await;
    let admin_cookie = app.login("root@agrisense.test", "RootPassword1").await;

    let root = app
        .store
        .find_by_email("root@agrisense.test")
        .await
        .unwrap()
        .unwrap();

    for next_role in ["farmer", "expert"] {
        let (status, body) = app.patch_role(&admin_cookie, &root.id, next_role).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["error"]["message"],
            "Authorization error: The primary administrator cannot be demoted"
        );
    }

    // Still admin, nothing audited
    let root = app.store.find_by_id(&root.id).await.unwrap().unwrap();
    assert_eq!(root.role, Role::Admin);
    assert!(app.audit.entries().is_empty());

    // Re-asserting admin is allowed and is not an audited change
    let (status, _) = app.patch_role(&admin_cookie, &root.id, "admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.audit.entries().is_empty());
}

#[tokio::test]
async fn test_equal_role_patch_performs_no_store_write() {
    let app = TestApp::new().await;
    let expert_id = app.seed_user("expert@experts.test", "password-x", Role::Expert).await;
    let admin_cookie = app.login("root@agrisense.test", "RootPassword1").await;
    let writes_before = app.store.write_count();

    let (status, body) = app.patch_role(&admin_cookie, &expert_id, "expert").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "expert");

    // No role change means no write (updated_at untouched) and no audit
    assert_eq!(app.store.write_count(), writes_before);
    assert!(app.audit.entries().is_empty());
}

#[tokio::test]
async fn test_role_update_requires_admin() {
    let app = TestApp::new().await;
    let expert_id = app.seed_user("expert@experts.test", "password-x", Role::Expert).await;
    let expert_cookie = app.login("expert@experts.test", "password-x").await;

    let (status, body) = app.patch_role(&expert_cookie, &expert_id, "admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Admin privileges required");
}

#[tokio::test]
async fn test_promotion_and_demotion_are_audited() {
    let app = TestApp::new().await;
    let farmer_id = app.seed_user("farmer@field.test", "plow-the-field", Role::Farmer).await;
    let admin_cookie = app.login("root@agrisense.test", "RootPassword1").await;

    let (status, _) = app.patch_role(&admin_cookie, &farmer_id, "admin").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.patch_role(&admin_cookie, &farmer_id, "farmer").await;
    assert_eq!(status, StatusCode::OK);

    let actions: Vec<String> = app
        .audit
        .entries()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["role.promote", "role.demote"]);
}

#[tokio::test]
async fn test_login_failure_is_uniform() {
    let app = TestApp::new().await;
    app.seed_user("known@field.test", "right-password", Role::Farmer).await;

    for (email, password) in [
        ("known@field.test", "wrong-password"),
        ("unknown@field.test", "right-password"),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap();
        let (status, body, cookie) = app.request(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"]["message"],
            "Authentication error: Invalid email or password"
        );
        assert!(cookie.is_none());
    }
}

#[tokio::test]
async fn test_register_sets_cookie_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "New Farmer",
                "email": "New@Field.Test",
                "password": "grow-things",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body, cookie) = app.request(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "farmer");
    assert_eq!(body["data"]["email"], "new@field.test");
    assert!(cookie.unwrap().starts_with(COOKIE_NAME));

    // Same email, different case
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "new@field.test", "password": "grow-things" }).to_string(),
        ))
        .unwrap();
    let (status, _, _) = app.request(request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_session_endpoint_reflects_live_record() {
    let app = TestApp::new().await;
    let farmer_id = app.seed_user("farmer@field.test", "plow-the-field", Role::Farmer).await;
    let cookie = app.login("farmer@field.test", "plow-the-field").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/session")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.request(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "farmer");

    // Role change shows up without reissuing the token
    app.store.update_role(&farmer_id, Role::Expert).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/session")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = app.request(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "expert");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    app.seed_user("farmer@field.test", "plow-the-field", Role::Farmer).await;
    let cookie = app.login("farmer@field.test", "plow-the-field").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _, set_cookie) = app.request(request).await;
    assert_eq!(status, StatusCode::OK);
    // Cleared value: `agrisense-session=`
    assert_eq!(set_cookie.unwrap(), format!("{COOKIE_NAME}="));
}

//! Signed-in router tests against a live PostgreSQL.
//!
//! Run with: DATABASE_URL=postgres://... cargo test --package resortops-web --test test_sessions -- --ignored --nocapture

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use resortops_common::auth::Role;
use resortops_config::Config;
use resortops_db::{Database, UserRepository};
use resortops_web::auth::hash_password;
use resortops_web::router::build_router;
use resortops_web::state::AppState;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const PASSWORD: &str = "monsoon-2026";

struct TestApp {
    router: Router,
    users: UserRepository,
}

async fn app() -> TestApp {
    let mut config = Config::default();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    // Uploads would fail if they ever reached this address.
    config.drive.access_token = Some(SecretString::from("test-token".to_string()));
    config.drive.upload_url = "http://127.0.0.1:1/upload".into();

    let db = Database::connect(&config.database).await.expect("connect to PostgreSQL");
    db.migrate().await.expect("run migrations");
    let db = Arc::new(db);
    TestApp { router: build_router(AppState::new(db.clone(), config)), users: UserRepository::new(db) }
}

impl TestApp {
    async fn user(&self, role: Role) -> (Uuid, String) {
        let username = format!("{role}-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let hash = hash_password(PASSWORD).expect("hash");
        let user = self.users.insert(&username, None, &hash, role).await.expect("insert user");
        (user.id, username)
    }

    async fn send(&self, req: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(req).await.expect("request failed")
    }

    /// Log in and return the `name=value` pair of the session cookie.
    async fn login(&self, username: &str) -> String {
        let resp = self
            .send(json_request("POST", "/api/auth/login", None, json!({"username": username, "password": PASSWORD})))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp.headers()[header::SET_COOKIE].to_str().expect("ascii cookie");
        set_cookie.split(';').next().expect("cookie pair").to_string()
    }
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("failed to build request")
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("failed to build request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
#[ignore]
async fn test_login_cookie_opens_api_until_logout() {
    let app = app().await;
    let (_, username) = app.user(Role::Manager).await;

    // Login ignores case
    let cookie = app.login(&username.to_uppercase()).await;

    let resp = app.send(get("/api/auth/me", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["username"], username.as_str());

    let resp = app.send(get("/api/vendors", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let logout = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("failed to build request");
    assert_eq!(app.send(logout).await.status(), StatusCode::NO_CONTENT);

    let resp = app.send(get("/api/auth/me", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_staff_role_cannot_manage() {
    let app = app().await;
    let (_, username) = app.user(Role::Staff).await;
    let cookie = app.login(&username).await;

    let staff = json!({
        "employee_code": format!("EMP-{}", &Uuid::new_v4().simple().to_string()[..8]),
        "full_name": "Ravi Kumar",
        "department": "Kitchen",
        "joining_date": "2025-04-01",
        "monthly_salary": "28000.00",
    });
    let resp = app.send(json_request("POST", "/api/staff", Some(&cookie), staff)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"], "forbidden");

    let resp = app.send(get("/api/users", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Reading stays open to staff
    let resp = app.send(get("/api/inventory/alerts", &cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_deactivated_user_is_signed_out() {
    let app = app().await;
    let (_, manager) = app.user(Role::Manager).await;
    let (staff_id, staff) = app.user(Role::Staff).await;
    let (admin_id, _) = app.user(Role::Admin).await;
    let manager_cookie = app.login(&manager).await;
    let staff_cookie = app.login(&staff).await;

    let uri = format!("/api/users/{staff_id}");
    let resp = app
        .send(json_request("PUT", &uri, Some(&manager_cookie), json!({"is_active": false})))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["is_active"], false);

    let resp = app.send(get("/api/auth/me", &staff_cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Managers cannot touch admins
    let uri = format!("/api/users/{admin_id}");
    let resp = app
        .send(json_request("PUT", &uri, Some(&manager_cookie), json!({"is_active": false})))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_upload_to_missing_bill_is_404_before_drive() {
    let app = app().await;
    let (_, username) = app.user(Role::Staff).await;
    let cookie = app.login(&username).await;

    let boundary = "resortops-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"entity_type\"\r\n\r\n\
         bill\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"entity_id\"\r\n\r\n\
         {id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"invoice.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.4\r\n\
         --{boundary}--\r\n",
        id = Uuid::new_v4(),
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .expect("failed to build request");

    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "not_found");
}

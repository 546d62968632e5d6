#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use chrono::Duration;
use serde_json::{json, Value};

use scoped_tasks::auth::{PasswordHasher, TokenCodec};
use scoped_tasks::routes;
use scoped_tasks::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const STRONG_PASSWORD: &str = "Password123!";

pub fn codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, Duration::hours(1))
}

/// In-memory state with the cheapest bcrypt cost.
pub fn test_state() -> AppState {
    AppState::in_memory(PasswordHasher::new(4).unwrap(), codec())
}

pub async fn init_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .configure(move |cfg| state.configure(cfg))
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn sign_up(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> StatusCode {
    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

/// Returns the response status and JSON body of a sign-in attempt.
pub async fn sign_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Signs `username` up with a policy-compliant password and returns a session token.
pub async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
) -> String {
    assert_eq!(sign_up(app, username, STRONG_PASSWORD).await, StatusCode::CREATED);
    let (status, body) = sign_in(app, username, STRONG_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
    body["token"]
        .as_str()
        .expect("token should be a string")
        .to_string()
}

/// Creates a task as the token's owner and returns the created JSON.
pub async fn create_task(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

/// GETs `uri` with the token and returns status and raw body.
pub async fn get_with_token(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    uri: &str,
) -> (StatusCode, actix_web::web::Bytes) {
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    (status, test::read_body(resp).await)
}

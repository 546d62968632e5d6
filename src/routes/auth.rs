use crate::{
    auth::{AuthMiddleware, AuthService, AuthenticatedUser, SignInRequest, SignUpRequest, TokenResponse},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: empty body.
/// - `400 Bad Request`: username or password fails validation.
/// - `409 Conflict`: the username is already taken.
#[post("/signup")]
pub async fn sign_up(
    auth: web::Data<AuthService>,
    body: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    auth.sign_up(&body.username, &body.password).await?;
    Ok(HttpResponse::Created().finish())
}

/// Sign in
///
/// Returns `{ "token": ... }`, or `401` with the same body for an unknown user and a
/// wrong password.
#[post("/signin")]
pub async fn sign_in(
    auth: web::Data<AuthService>,
    body: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let token = auth.sign_in(&body.username, &body.password).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Confirms that the bearer token is still accepted.
#[post("/test", wrap = "AuthMiddleware")]
pub async fn token_check(user: AuthenticatedUser) -> impl Responder {
    log::debug!("Token check passed for user \"{}\"", user.0.username);
    HttpResponse::Ok().json(json!({ "status": "Token is valid" }))
}

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{StatusUpdate, TaskFilter, TaskInput},
    store::TaskStore,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): `OPEN`, `IN_PROGRESS` or `DONE`.
/// - `search` (optional, non-empty): case-insensitive match against title or description.
///
/// Tasks are ordered by id ascending.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `400 Bad Request`: unknown status or empty search term.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    store: web::Data<dyn TaskStore>,
    filter: web::Query<TaskFilter>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    filter.validate()?;
    log::debug!(
        "User \"{}\" retrieving tasks. Filters: {:?}",
        user.0.username,
        &*filter
    );

    let tasks = store.list(&user.0, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1-200 characters.
/// - `description`: required, 1-1000 characters.
/// - `status` (optional): defaults to `OPEN`.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: body fails validation.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    body: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let task = store.create(body.into_inner(), &user.0).await?;
    log::info!(
        "User \"{}\" created task {} ({:?})",
        user.0.username,
        task.id,
        task.title
    );
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the authenticated user's tasks.
///
/// Tasks owned by someone else answer `404 Not Found`, exactly like missing ones.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = store.get_by_id(task_id.into_inner(), &user.0).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Changes the status of one of the authenticated user's tasks.
///
/// ## Request Body:
/// `{ "status": "OPEN" | "IN_PROGRESS" | "DONE" }`
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: unknown status.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task under this user.
#[patch("/{id}/status")]
pub async fn update_task_status(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i32>,
    body: web::Json<StatusUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = store
        .update_status(task_id.into_inner(), body.status, &user.0)
        .await?;
    log::info!(
        "User \"{}\" moved task {} to {:?}",
        user.0.username,
        task.id,
        task.status
    );
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the authenticated user's tasks.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task under this user.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    store.delete(id, &user.0).await?;
    log::info!("User \"{}\" deleted task {}", user.0.username, id);
    Ok(HttpResponse::NoContent().finish())
}

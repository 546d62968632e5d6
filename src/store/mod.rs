//! Record stores behind the auth and task services.
//!
//! Both traits are narrow on purpose: every method that touches a task takes the
//! owning [`User`], and implementations must bake `user_id = owner.id` into the
//! underlying query. Uniqueness of usernames is likewise the store's job, enforced by
//! a constraint rather than a lookup followed by an insert.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskFilter, TaskInput, TaskStatus, User};

pub use memory::{InMemoryCredentialStore, InMemoryTaskStore};
pub use postgres::{PgCredentialStore, PgTaskStore};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user, failing with [`AppError::DuplicateIdentity`] if the username is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Creates a task owned by `owner`. Status defaults to `OPEN`.
    async fn create(&self, input: TaskInput, owner: &User) -> Result<Task, AppError>;

    /// Lists `owner`'s tasks matching `filter`, ordered by id ascending.
    async fn list(&self, owner: &User, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;

    /// Fails with [`AppError::NotFound`] unless a task with `id` is owned by `owner`.
    async fn get_by_id(&self, id: i32, owner: &User) -> Result<Task, AppError>;

    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: &User,
    ) -> Result<Task, AppError>;

    async fn delete(&self, id: i32, owner: &User) -> Result<(), AppError>;
}

pub(crate) fn task_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Task with ID '{}' not found", id))
}

pub(crate) fn username_taken(username: &str) -> AppError {
    AppError::DuplicateIdentity(format!("Username '{}' already exists", username))
}

/// Usernames and task titles are never empty, whichever store holds them.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(())
}

//! Postgres-backed stores.
//!
//! Queries are built at runtime with `sqlx::query_as`, so no database is needed at
//! compile time. Every task statement carries `user_id = $n`, and mutations use a
//! single `UPDATE`/`DELETE` whose affected rows decide between success and `NotFound`.

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{require_non_empty, task_not_found, username_taken, CredentialStore, TaskStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskFilter, TaskInput, TaskStatus, User};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str = "id, username, password_hash, salt, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

/// Maps a violated `CHECK` constraint to a validation failure; anything else stays a
/// database error.
fn check_violation(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            AppError::ValidationError(format!("Rejected by the database: {}", db_err.message()))
        }
        other => AppError::from(other),
    }
}

/// Opens a connection pool and brings the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        require_non_empty("username", &new_user.username)?;
        let sql = format!(
            "INSERT INTO users (username, password_hash, salt) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(&new_user.salt)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                // users_username_key: the UNIQUE constraint is the only uniqueness check.
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    username_taken(&new_user.username)
                }
                other => check_violation(other),
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, input: TaskInput, owner: &User) -> Result<Task, AppError> {
        require_non_empty("title", &input.title)?;
        let sql = format!(
            "INSERT INTO tasks (title, description, status, user_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.status.unwrap_or_default())
            .bind(owner.id)
            .fetch_one(&self.pool)
            .await
            .map_err(check_violation)?;
        Ok(task)
    }

    async fn list(&self, owner: &User, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let sql = list_sql(filter);
        let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner.id);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(search) = &filter.search {
            query = query.bind(like_pattern(search));
        }
        let tasks = query.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn get_by_id(&self, id: i32, owner: &User) -> Result<Task, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: &User,
    ) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET status = $1, updated_at = now() \
             WHERE id = $2 AND user_id = $3 RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(status)
            .bind(id)
            .bind(owner.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    async fn delete(&self, id: i32, owner: &User) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found(id));
        }
        Ok(())
    }
}

/// Builds the listing statement. `$1` is always the owner; filter params follow in order.
fn list_sql(filter: &TaskFilter) -> String {
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    if filter.status.is_some() {
        sql.push_str(" AND status = $2");
    }
    if filter.search.is_some() {
        let param = if filter.status.is_some() { 3 } else { 2 };
        sql.push_str(&format!(
            " AND (title ILIKE ${0} OR description ILIKE ${0})",
            param
        ));
    }
    sql.push_str(" ORDER BY id ASC");
    sql
}

/// Wraps `search` for a literal substring `ILIKE` match.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

//! In-process stores used by the test suite and by database-less runs.
//!
//! Each table sits behind a single `RwLock`, so a uniqueness check and the insert it
//! guards happen under the same write guard.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{require_non_empty, task_not_found, username_taken, CredentialStore, TaskStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskFilter, TaskInput, TaskStatus, User};

#[derive(Default)]
struct UserTable {
    last_id: i32,
    by_username: HashMap<String, User>,
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<UserTable>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        require_non_empty("username", &new_user.username)?;
        let mut table = self.users.write().await;
        if table.by_username.contains_key(&new_user.username) {
            return Err(username_taken(&new_user.username));
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            salt: new_user.salt,
            created_at: Utc::now(),
        };
        table.by_username.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.by_username.get(username).cloned())
    }
}

#[derive(Default)]
struct TaskTable {
    last_id: i32,
    // BTreeMap keeps iteration in id order, which is the listing order.
    by_id: BTreeMap<i32, Task>,
}

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<TaskTable>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, input: TaskInput, owner: &User) -> Result<Task, AppError> {
        require_non_empty("title", &input.title)?;
        let mut table = self.tasks.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let task = Task {
            id: table.last_id,
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            user_id: owner.id,
            created_at: now,
            updated_at: now,
        };
        table.by_id.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list(&self, owner: &User, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let table = self.tasks.read().await;
        Ok(table
            .by_id
            .values()
            .filter(|task| task.user_id == owner.id && filter.matches(task))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i32, owner: &User) -> Result<Task, AppError> {
        let table = self.tasks.read().await;
        table
            .by_id
            .get(&id)
            .filter(|task| task.user_id == owner.id)
            .cloned()
            .ok_or_else(|| task_not_found(id))
    }

    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: &User,
    ) -> Result<Task, AppError> {
        let mut table = self.tasks.write().await;
        let task = table
            .by_id
            .get_mut(&id)
            .filter(|task| task.user_id == owner.id)
            .ok_or_else(|| task_not_found(id))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: i32, owner: &User) -> Result<(), AppError> {
        let mut table = self.tasks.write().await;
        let owned = table
            .by_id
            .get(&id)
            .map_or(false, |task| task.user_id == owner.id);
        if !owned {
            return Err(task_not_found(id));
        }
        table.by_id.remove(&id);
        Ok(())
    }
}

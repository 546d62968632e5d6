pub mod task;
pub mod user;

pub use task::{StatusUpdate, Task, TaskFilter, TaskInput, TaskStatus};
pub use user::{NewUser, User};

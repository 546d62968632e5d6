#![doc = "The `scoped_tasks` library crate."]
#![doc = ""]
#![doc = "Salted-password sign-up and sign-in, stateless session tokens, and a task list"]
#![doc = "where every read and write is scoped to the authenticated user. The binary"]
#![doc = "(`main.rs`) wires these pieces into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;

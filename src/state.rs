use std::sync::Arc;

use actix_web::{error, web, HttpRequest};

use crate::auth::{AccessGate, AuthService, PasswordHasher, TokenCodec};
use crate::error::AppError;
use crate::store::{CredentialStore, InMemoryCredentialStore, InMemoryTaskStore, TaskStore};

/// The services handlers reach through `web::Data`, wired by hand from the two stores.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub gate: web::Data<AccessGate>,
    pub tasks: web::Data<dyn TaskStore>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(
                credentials.clone(),
                hasher,
                codec.clone(),
            )),
            gate: web::Data::new(AccessGate::new(codec, credentials)),
            tasks: web::Data::from(tasks),
        }
    }

    /// State backed by the in-process stores.
    pub fn in_memory(hasher: PasswordHasher, codec: TokenCodec) -> Self {
        Self::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryTaskStore::new()),
            hasher,
            codec,
        )
    }

    /// Registers the services and the extractor error handlers on an app or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.gate.clone())
            .app_data(self.tasks.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::PathConfig::default().error_handler(path_error));
    }
}

// Malformed bodies, filters and ids are validation failures, not framework errors.

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid query parameters: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid path parameter: {}", err)).into()
}

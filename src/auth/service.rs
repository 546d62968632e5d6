use std::sync::Arc;

use crate::auth::password::{PasswordHasher, Salt};
use crate::auth::token::TokenCodec;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::{require_non_empty, CredentialStore};

/// Sign-up and sign-in on top of a credential store.
///
/// bcrypt work runs on tokio's blocking pool so it never stalls the worker that
/// serves other requests.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
    ) -> Self {
        Self {
            credentials,
            hasher,
            codec,
        }
    }

    /// Registers `username`. A taken name surfaces as `AppError::DuplicateIdentity`.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, AppError> {
        require_non_empty("username", username)?;
        let salt = self.hasher.generate_salt();
        let password_hash = self.hash_off_thread(password, salt).await?;

        let user = self
            .credentials
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                salt: salt.to_hex(),
            })
            .await?;

        log::info!("User \"{}\" signed up with id {}", user.username, user.id);
        Ok(user)
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown users and wrong passwords both fail with `AppError::InvalidCredentials`,
    /// and both pay for one hash so response timing does not tell them apart.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.credentials.find_by_username(username).await? {
            Some(user) => user,
            None => {
                let decoy = self.hasher.generate_salt();
                self.hash_off_thread(password, decoy).await?;
                log::warn!("Failed sign-in for unknown user \"{}\"", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        let salt = Salt::from_hex(&user.salt)?;
        let hasher = self.hasher;
        let plaintext = password.to_string();
        let stored = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &salt, &stored))
                .await??;

        if !matches {
            log::warn!("Failed sign-in for user \"{}\"", username);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.codec.issue(&user.username)?;
        log::debug!("Generated token for user \"{}\"", user.username);
        log::info!("User \"{}\" signed in", user.username);
        Ok(token)
    }

    async fn hash_off_thread(&self, password: &str, salt: Salt) -> Result<String, AppError> {
        let hasher = self.hasher;
        let plaintext = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext, &salt)).await?
    }
}

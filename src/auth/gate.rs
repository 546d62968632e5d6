use std::sync::Arc;

use crate::auth::token::TokenCodec;
use crate::error::AppError;
use crate::models::User;
use crate::store::CredentialStore;

/// Turns a bearer token into the `User` it was issued to.
///
/// This is the only place an identity gets attached to a request; task handlers
/// receive the resolved `User` and pass it to every store call.
pub struct AccessGate {
    codec: TokenCodec,
    credentials: Arc<dyn CredentialStore>,
}

impl AccessGate {
    pub fn new(codec: TokenCodec, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { codec, credentials }
    }

    /// Fails with `InvalidToken` for bad or expired tokens, and with `Unauthorized`
    /// when the token is valid but its user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self.codec.verify(token).map_err(|err| {
            log::warn!("Rejected token: {}", err);
            err
        })?;

        self.credentials
            .find_by_username(&claims.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::InMemoryCredentialStore;
    use chrono::Duration;

    async fn gate_with(usernames: &[&str]) -> (AccessGate, TokenCodec) {
        let store = InMemoryCredentialStore::new();
        for username in usernames {
            store
                .create(NewUser {
                    username: username.to_string(),
                    password_hash: "digest".into(),
                    salt: "00".repeat(16),
                })
                .await
                .unwrap();
        }
        let codec = TokenCodec::new("gate_test_secret", Duration::hours(1));
        (AccessGate::new(codec.clone(), Arc::new(store)), codec)
    }

    #[actix_rt::test]
    async fn test_authenticate_resolves_the_claimed_user() {
        let (gate, codec) = gate_with(&["alice", "bob"]).await;

        let alice = gate.authenticate(&codec.issue("alice").unwrap()).await.unwrap();
        let bob = gate.authenticate(&codec.issue("bob").unwrap()).await.unwrap();

        assert_eq!(alice.username, "alice");
        assert_eq!(bob.username, "bob");
        assert_ne!(alice.id, bob.id);
    }

    #[actix_rt::test]
    async fn test_vanished_user_is_unauthorized() {
        let (gate, codec) = gate_with(&["alice"]).await;
        let token = codec.issue("ghost").unwrap();

        assert!(matches!(
            gate.authenticate(&token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_rt::test]
    async fn test_bad_tokens_are_invalid() {
        let (gate, codec) = gate_with(&["alice"]).await;
        let expired = codec
            .issue_with_ttl("alice", Duration::seconds(-10))
            .unwrap();
        let foreign = TokenCodec::new("other_secret", Duration::hours(1))
            .issue("alice")
            .unwrap();

        for token in [expired.as_str(), foreign.as_str(), "garbage"] {
            assert!(matches!(
                gate.authenticate(token).await,
                Err(AppError::InvalidToken(_))
            ));
        }
    }
}

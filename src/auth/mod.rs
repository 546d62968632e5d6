pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use gate::AccessGate;
pub use middleware::AuthMiddleware;
pub use password::{PasswordHasher, Salt};
pub use service::AuthService;
pub use token::{Claims, TokenCodec};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Desired username for the new account.
    /// Must be between 4 and 20 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 4, max = 20),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account.
    /// Must be between 8 and 20 characters and pass `validate_password_strength`.
    #[validate(length(min = 8, max = 20), custom = "validate_password_strength")]
    pub password: String,
}

/// Represents the payload for a sign-in request.
///
/// Only presence is checked here; anything else is answered with the same
/// "Invalid credentials" as a wrong password.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response body of a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session token, sent back as `Authorization: Bearer <token>`.
    pub token: String,
}

/// Requires an uppercase letter, a lowercase letter, and a digit or symbol.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit_or_symbol = password.chars().any(|c| !c.is_alphabetic());

    if has_upper && has_lower && has_digit_or_symbol {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_too_weak");
        error.message = Some(
            "Password must contain an uppercase letter, a lowercase letter, and a number or symbol"
                .into(),
        );
        Err(error)
    }
}

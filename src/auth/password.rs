//! Salted bcrypt hashing with an explicit, separately persisted salt.

use rand::{rngs::OsRng, RngCore};

use crate::error::AppError;

pub const SALT_LEN: usize = 16;

/// Random per-user salt, generated once at sign-up and stored hex-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(encoded: &str) -> Result<Self, AppError> {
        let bytes = hex::decode(encoded)
            .map_err(|e| AppError::InternalServerError(format!("Stored salt is corrupt: {}", e)))?;
        let bytes: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            AppError::InternalServerError("Stored salt has the wrong length".into())
        })?;
        Ok(Salt(bytes))
    }
}

impl From<[u8; SALT_LEN]> for Salt {
    fn from(bytes: [u8; SALT_LEN]) -> Self {
        Salt(bytes)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        if !(4..=31).contains(&cost) {
            return Err(AppError::InternalServerError(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn generate_salt(&self) -> Salt {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Salt(bytes)
    }

    /// Deterministic for a given `(plaintext, salt)` at this hasher's cost.
    pub fn hash(&self, plaintext: &str, salt: &Salt) -> Result<String, AppError> {
        hash_at_cost(plaintext, salt, self.cost)
    }

    /// Recomputes the digest at the cost recorded in `stored_digest` and compares
    /// in constant time.
    pub fn verify(
        &self,
        plaintext: &str,
        salt: &Salt,
        stored_digest: &str,
    ) -> Result<bool, AppError> {
        let cost = digest_cost(stored_digest).ok_or_else(|| {
            AppError::InternalServerError("Stored password digest is malformed".into())
        })?;
        let candidate = hash_at_cost(plaintext, salt, cost)?;
        Ok(constant_time_eq(candidate.as_bytes(), stored_digest.as_bytes()))
    }
}

fn hash_at_cost(plaintext: &str, salt: &Salt, cost: u32) -> Result<String, AppError> {
    let parts = bcrypt::hash_with_salt(plaintext, cost, salt.0)?;
    Ok(parts.format_for_version(bcrypt::Version::TwoB))
}

/// Reads the cost field out of a `$2b$<cost>$...` digest.
fn digest_cost(digest: &str) -> Option<u32> {
    digest.split('$').nth(2)?.parse().ok()
}

/// Constant-time byte comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

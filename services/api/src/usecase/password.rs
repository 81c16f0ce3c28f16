//! Argon2id password hashing (PHC string format).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use rand::Rng;

use crate::error::ApiError;

/// Hash a plaintext secret into a PHC string with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("encode salt: {e}")))?;

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("hash password: {e}")))
}

/// Verify a plaintext secret against a stored PHC string.
/// An unparseable hash verifies as false rather than erroring — a stored hash
/// in an unknown format must read as "wrong password", not a 500.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

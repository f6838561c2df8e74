//! Password hashing — bcrypt with the library's default cost.

use bcrypt::{DEFAULT_COST, hash, verify};

pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    hash(plain, DEFAULT_COST)
}

/// Verify a plaintext password against a stored hash. A malformed stored
/// hash verifies false rather than surfacing an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}

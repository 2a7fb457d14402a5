//! Password hashing and verification for the local authentication path.
//!
//! [`hash_password`] generates a random salt via [`OsRng`], hashes the
//! plaintext with the default Argon2id parameters, and returns a PHC-format
//! string (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`) for the
//! `password_hash` column.
//!
//! [`verify_password`] parses a stored PHC string and checks the supplied
//! plaintext against it. A mismatch is an ordinary `Ok(false)` outcome; only
//! a malformed stored hash surfaces as an error.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

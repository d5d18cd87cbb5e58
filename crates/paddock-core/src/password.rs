//! Password hashing and verification.
//!
//! New hashes are argon2id PHC strings. Rows written before the switch hold
//! bcrypt hashes (`$2a$`, `$2b$`, `$2y$`); those still verify.

use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
  #[error("argon2: {0}")]
  Argon2(argon2::password_hash::Error),

  #[error("bcrypt: {0}")]
  Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<argon2::password_hash::Error> for PasswordError {
  fn from(e: argon2::password_hash::Error) -> Self { Self::Argon2(e) }
}

/// Hash a password using argon2id with a random salt; returns the PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
  Ok(hash.to_string())
}

/// Whether `hash` is in the legacy bcrypt format.
pub fn is_bcrypt(hash: &str) -> bool { hash.starts_with("$2") }

/// Verify a password against a stored hash, argon2id or legacy bcrypt.
///
/// A hash that does not parse is an error; a well-formed hash that does not
/// match is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
  if is_bcrypt(hash) {
    return Ok(bcrypt::verify(password, hash)?);
  }

  let parsed = PasswordHash::new(hash)?;
  Ok(
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
  )
}

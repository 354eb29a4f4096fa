use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

/// Longest plaintext accepted for hashing, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("password is {len} bytes, longer than the {max} byte limit")]
    TooLong { len: usize, max: usize },
    #[error("password hashing failed: {0}")]
    Algorithm(String),
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// One-way password hashing capability used by the signup/login workflow.
pub trait CredentialHasher: Send + Sync {
    /// Produces a self-salted digest of `plain`.
    fn hash(&self, plain: &str) -> Result<String, HashingError>;

    /// `true` iff `plain` matches `digest`. Malformed digests yield `false`.
    fn verify(&self, plain: &str, digest: &str) -> bool;
}

/// Argon2id with the crate defaults: m = 19 MiB, t = 2, p = 1.
///
/// Digests are PHC strings, so the parameters travel with every stored hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, HashingError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(HashingError::TooLong {
                len: plain.len(),
                max: MAX_PASSWORD_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                HashingError::Algorithm(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Cheap reversible stand-in so workflow tests don't pay for Argon2.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PlainHasher;

#[cfg(test)]
impl CredentialHasher for PlainHasher {
    fn hash(&self, plain: &str) -> Result<String, HashingError> {
        Ok(format!("plain${plain}"))
    }

    fn verify(&self, plain: &str, digest: &str) -> bool {
        digest.strip_prefix("plain$") == Some(plain)
    }
}

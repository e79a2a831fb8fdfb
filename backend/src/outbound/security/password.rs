//! Argon2 password hashing.
//!
//! Hashing is CPU bound, so both operations run on the blocking thread pool.
//! Hashes are stored in the PHC-encoded form, which carries the salt and
//! parameters alongside the digest.

use async_trait::async_trait;
use rand::RngCore;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::Password;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

const SALT_LEN: usize = 16;

/// Copy of plaintext handed to the blocking pool, wiped on drop.
fn secret_copy(raw: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(raw.as_bytes().to_vec())
}

/// [`PasswordHasher`] backed by `rust-argon2` with its default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<String, PasswordHashError> {
        let pwd = secret_copy(password.expose());
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        task::spawn_blocking(move || {
            argon2::hash_encoded(pwd.as_slice(), &salt, &argon2::Config::default())
        })
        .await
        .map_err(|err| PasswordHashError::hash(err.to_string()))?
        .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    async fn verify(&self, candidate: &str, encoded: &str) -> Result<bool, PasswordHashError> {
        let pwd = secret_copy(candidate);
        let encoded = encoded.to_owned();

        task::spawn_blocking(move || argon2::verify_encoded(&encoded, pwd.as_slice()))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
            .map_err(|err| PasswordHashError::malformed(err.to_string()))
    }
}

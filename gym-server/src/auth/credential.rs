//! Shared login credential
//!
//! The service has a single operator account. Its password is hashed with
//! argon2 when the state is built and only the hash is kept.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::core::ServerError;

pub struct SharedCredential {
    username: String,
    password_hash: String,
}

impl std::fmt::Debug for SharedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCredential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SharedCredential {
    /// Hash `password` for `username`
    pub fn from_plaintext(username: &str, password: &str) -> Result<Self, ServerError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServerError::Credential(e.to_string()))?
            .to_string();
        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exact username match and argon2 password verification.
    ///
    /// The hash is checked even on a username mismatch so both failures
    /// cost the same.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            tracing::error!("Stored credential hash is unreadable");
            return false;
        };
        let password_ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        password_ok && username == self.username
    }
}

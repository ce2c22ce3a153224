use argon2::{
    Argon2, PasswordHash as Argon2Hash,
    password_hash::{PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE};

use crate::domain::{
    error::DomainError,
    models::credential::HashedPassword,
    services::password_service::PasswordHasher,
};

/// Argon2id hasher. The PHC string it produces is stored base64-url encoded.
#[derive(Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| DomainError::Credential(e.to_string()))?
            .to_string();

        Ok(HashedPassword::new(URL_SAFE.encode(hash)))
    }

    fn verify(&self, plain_password: &str, hashed_password: &HashedPassword) -> bool {
        let Ok(decoded) = URL_SAFE.decode(hashed_password.as_str()) else {
            return false;
        };
        let Ok(phc) = String::from_utf8(decoded) else {
            return false;
        };
        let Ok(parsed_hash) = Argon2Hash::new(&phc) else {
            return false;
        };

        Argon2::default()
            .verify_password(plain_password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

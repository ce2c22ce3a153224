use crate::domain::{
    error::DomainError,
    models::{credential::HashedPassword, user::User},
    validation::{PASSWORD_POLICY_MESSAGE, validate_password},
};

/// Service for hashing and verifying passwords
pub trait PasswordHasher: Clone {
    /// Hash a plain text password into its stored, encoded form
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError>;

    /// Verify a plain text password against a stored hash.
    /// Malformed hashes simply fail to verify.
    fn verify(&self, plain_password: &str, hashed_password: &HashedPassword) -> bool;
}

/// Validate the user's plaintext password against the policy and replace it
/// in place with its hash.
pub fn handle_password<P: PasswordHasher>(hasher: &P, user: &mut User) -> Result<(), DomainError> {
    if !validate_password(&user.password) {
        return Err(DomainError::ValidationFailed(vec![
            PASSWORD_POLICY_MESSAGE.to_string(),
        ]));
    }

    let hashed = hasher.hash(&user.password)?;
    user.password = hashed.into_string();

    Ok(())
}

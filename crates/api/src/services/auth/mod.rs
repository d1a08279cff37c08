//! Customer credentials.
//!
//! Customers always get a real credential: either the password supplied at
//! signup or a random one generated here. Only the Argon2id hash is stored.
//! Group and permission management belongs to an external authorization
//! service and is not handled in this crate.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of generated passwords.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// A hashed credential ready to be stored.
#[derive(Debug, Clone)]
pub struct Credential {
    hash: String,
    /// Whether the password was generated rather than chosen by the customer.
    pub generated: bool,
}

impl Credential {
    /// Build a credential from an optional customer-chosen password.
    ///
    /// Without a password, a random one is generated and discarded after
    /// hashing; the customer must reset it before logging in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the supplied password is too short.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn new(password: Option<&SecretString>) -> Result<Self, AuthError> {
        match password {
            Some(password) => {
                validate_password(password.expose_secret())?;
                Ok(Self {
                    hash: hash_password(password.expose_secret())?,
                    generated: false,
                })
            }
            None => {
                let password = generate_password();
                Ok(Self {
                    hash: hash_password(password.expose_secret())?,
                    generated: true,
                })
            }
        }
    }

    /// Consume the credential, returning the hash.
    #[must_use]
    pub fn into_hash(self) -> String {
        self.hash
    }
}

/// Check a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn generate_password() -> SecretString {
    let password: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect();
    SecretString::from(password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_password_round_trips() {
        let password = SecretString::from("correct horse");
        let credential = Credential::new(Some(&password)).unwrap();
        assert!(!credential.generated);
        let hash = credential.into_hash();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        let password = SecretString::from("1234567");
        let err = Credential::new(Some(&password)).unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[test]
    fn test_generated_credentials_differ() {
        let a = Credential::new(None).unwrap();
        let b = Credential::new(None).unwrap();
        assert!(a.generated);
        assert_ne!(a.into_hash(), b.into_hash());
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.expose_secret().len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.expose_secret().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::PasswordHash)
        ));
    }
}

//! Password hashing with PBKDF2-HMAC-SHA256.
//!
//! Hashes are stored as `iterations:base64(salt):base64(hash)` so that the
//! work factor can be raised later without invalidating existing accounts.

use std::env;
use std::num::NonZeroU32;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use super::token::SecurityError;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Work factor used when `PASSWORD_HASH_ITERATIONS` is unset
pub const DEFAULT_ITERATIONS: u32 = 100_000;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

fn configured_iterations() -> NonZeroU32 {
    env::var("PASSWORD_HASH_ITERATIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(NonZeroU32::new)
        .or_else(|| NonZeroU32::new(DEFAULT_ITERATIONS))
        .unwrap_or(NonZeroU32::MIN)
}

/// Hash a password and return a storable string
pub fn hash_password(password: &str) -> Result<String, SecurityError> {
    let rng = SystemRandom::new();

    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| SecurityError::Generic("failed to generate random salt".to_string()))?;

    let iterations = configured_iterations();
    let mut hash = [0u8; KEY_LEN];
    pbkdf2::derive(PBKDF2_ALG, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!("{}:{}:{}", iterations, BASE64.encode(salt), BASE64.encode(hash)))
}

/// Verify a password against a stored hash string.
///
/// A malformed stored value is an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, SecurityError> {
    let mut parts = stored.splitn(3, ':');
    let (Some(iterations), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SecurityError::Generic("malformed password hash".to_string()));
    };

    let iterations = iterations
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| SecurityError::Generic("invalid iteration count in password hash".to_string()))?;
    let salt = BASE64
        .decode(salt)
        .map_err(|e| SecurityError::Generic(format!("invalid salt encoding: {e}")))?;
    let expected = BASE64
        .decode(expected)
        .map_err(|e| SecurityError::Generic(format!("invalid hash encoding: {e}")))?;

    Ok(pbkdf2::verify(PBKDF2_ALG, iterations, &salt, password.as_bytes(), &expected).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("patient123").unwrap();
        assert_eq!(stored.split(':').count(), 3);

        assert!(verify_password("patient123", &stored).unwrap());
        assert!(!verify_password("patient124", &stored).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        assert_ne!(hash_password("secret1").unwrap(), hash_password("secret1").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "plain-text-password").is_err());
        assert!(verify_password("x", "abc:AAAA:AAAA").is_err());
    }
}

//! Key derivation using Argon2id
//!
//! Turns the user-supplied data secret into a 32-byte AES key using Argon2id,
//! a memory-hard KDF. A fresh random salt is generated for every seal and
//! stored alongside the blob so unseal can re-derive the same key.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, Params,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{IntakeError, IntakeResult};

/// Parameters for key derivation, persisted inside the encrypted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt for key derivation (base64 encoded)
    pub salt: String,
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism degree
    pub parallelism: u32,
}

impl KeyDerivationParams {
    /// Create params with a fresh random salt and the standard cost profile
    /// (64 MiB, 3 iterations, 4 lanes)
    pub fn generate() -> Self {
        let salt = SaltString::generate(&mut OsRng);
        Self {
            salt: salt.to_string(),
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; 32],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey").finish_non_exhaustive()
    }
}

/// Derive an encryption key from a secret
pub fn derive_key(secret: &str, params: &KeyDerivationParams) -> IntakeResult<DerivedKey> {
    let salt = SaltString::from_b64(&params.salt)
        .map_err(|e| IntakeError::Crypto(format!("Invalid salt: {}", e)))?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| IntakeError::Crypto(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| IntakeError::Crypto(format!("Key derivation failed: {}", e)))?;

    let hash_output = hash
        .hash
        .ok_or_else(|| IntakeError::Crypto("No hash output generated".to_string()))?;

    let hash_bytes = hash_output.as_bytes();
    if hash_bytes.len() < 32 {
        return Err(IntakeError::Crypto(
            "Hash output too short for AES-256 key".to_string(),
        ));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&hash_bytes[..32]);

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_length() {
        let params = KeyDerivationParams::generate();
        let key = derive_key("correct horse battery staple", &params).unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn test_same_secret_same_salt_same_key() {
        let params = KeyDerivationParams::generate();
        let key1 = derive_key("secret", &params).unwrap();
        let key2 = derive_key("secret", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let params = KeyDerivationParams::generate();
        let key1 = derive_key("secret one", &params).unwrap();
        let key2 = derive_key("secret two", &params).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_fresh_salt_changes_key() {
        let key1 = derive_key("same secret", &KeyDerivationParams::generate()).unwrap();
        let key2 = derive_key("same secret", &KeyDerivationParams::generate()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_invalid_salt_rejected() {
        let mut params = KeyDerivationParams::generate();
        params.salt = "not base64!!!".into();
        assert!(derive_key("secret", &params).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let params = KeyDerivationParams::generate();
        let key = derive_key("secret", &params).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("key: ["));
    }
}

//! AES-256-GCM field encryption
//!
//! Authenticated encryption for individual field values. Every call
//! generates a fresh 96-bit nonce, so equal plaintexts never produce equal
//! ciphertexts across fields or re-saves. Callers supply associated data
//! that is authenticated alongside the ciphertext: a value decrypts only in
//! the exact context it was encrypted under, so ciphertexts cannot be
//! swapped between fields.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{IntakeError, IntakeResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// One encrypted field value: nonce plus ciphertext-with-tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The ciphertext with trailing authentication tag (base64 encoded)
    pub ciphertext: String,
}

impl EncryptedValue {
    fn decode_nonce(&self) -> IntakeResult<Vec<u8>> {
        STANDARD
            .decode(&self.nonce)
            .map_err(|e| IntakeError::Authentication(format!("Invalid nonce encoding: {}", e)))
    }

    fn decode_ciphertext(&self) -> IntakeResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| IntakeError::Authentication(format!("Invalid ciphertext encoding: {}", e)))
    }
}

/// Encrypt plaintext bytes with a fresh random nonce.
///
/// `aad` is authenticated but not encrypted; [`decrypt`] must be called with
/// the identical bytes.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey, aad: &[u8]) -> IntakeResult<EncryptedValue> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| IntakeError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| IntakeError::Crypto(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedValue {
        nonce: STANDARD.encode(nonce_bytes),
        ciphertext: STANDARD.encode(&ciphertext),
    })
}

/// Decrypt and authenticate a field value
///
/// Fails with [`IntakeError::Authentication`] on a wrong key, tampering, or
/// associated data that differs from what [`encrypt`] was given; never
/// returns unauthenticated plaintext.
pub fn decrypt(encrypted: &EncryptedValue, key: &DerivedKey, aad: &[u8]) -> IntakeResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| IntakeError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let nonce_bytes = encrypted.decode_nonce()?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(IntakeError::Authentication(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = encrypted.decode_ciphertext()?;

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext.as_ref(),
                aad,
            },
        )
        .map_err(|_| IntakeError::Authentication("wrong secret or corrupted data".to_string()))
}

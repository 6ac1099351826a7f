//! Cryptographic primitives for field-level encryption
//!
//! AES-256-GCM authenticated encryption with Argon2id key derivation.
//! Derived keys and secrets are zeroed as soon as they drop.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, EncryptedValue};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
pub use secure_memory::SecureString;

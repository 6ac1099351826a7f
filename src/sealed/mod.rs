//! Security module: encrypted-at-rest records
//!
//! Seal/unseal between [`IntakeRecord`](crate::models::IntakeRecord) and
//! [`EncryptedRecord`], plus atomic persistence and secure deletion of the
//! stored blobs.

pub mod record;
pub mod store;

pub use record::{seal, unseal, EncryptedRecord, SealedField, SCHEMA_VERSION};
pub use store::{load, save, secure_delete};

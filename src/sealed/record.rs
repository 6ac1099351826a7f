//! Encrypted-at-rest record representation
//!
//! [`seal`] converts a validated record into an [`EncryptedRecord`]: sensitive
//! fields become independent AEAD ciphertexts, non-sensitive fields pass
//! through in the clear so the stored blob stays partially inspectable.
//! [`unseal`] reverses it given the correct secret, failing closed on a wrong
//! secret, a tampered blob, or an unrecognized schema version.
//!
//! Integrity covers the whole blob, not just the sealed values. Each
//! ciphertext is bound to its field name and the schema version as AEAD
//! associated data, so ciphertexts cannot be swapped between fields. A
//! record-level tag authenticates the plain fields and the field layout, so
//! rewriting a plaintext value, renaming, reordering, adding, or dropping a
//! field all fail unseal as tampering.
//!
//! Every seal generates a fresh KDF salt and fresh per-field nonces;
//! cryptographic material is never reused across saves.

use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt, derive_key, encrypt, DerivedKey, EncryptedValue, KeyDerivationParams, SecureString};
use crate::error::{IntakeError, IntakeResult};
use crate::models::{FieldValue, IntakeRecord, RecordField};
use crate::schema::IntakeSchema;

/// Version of the persisted blob layout this build reads and writes
pub const SCHEMA_VERSION: u8 = 1;

/// One field of an encrypted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SealedField {
    /// Non-sensitive field, stored in the clear
    Plain { name: String, value: FieldValue },
    /// Sensitive field, stored as nonce + ciphertext + tag
    Sealed { name: String, data: EncryptedValue },
}

impl SealedField {
    /// Schema name of the field
    pub fn name(&self) -> &str {
        match self {
            SealedField::Plain { name, .. } => name,
            SealedField::Sealed { name, .. } => name,
        }
    }
}

/// The encrypted-at-rest form of an intake record
///
/// Self-describing: schema version, key-derivation parameters (including the
/// salt), per-field entries in record order, and a record-level integrity
/// tag over the plain fields and the field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Blob layout version, checked before any decryption
    pub version: u8,
    /// KDF parameters used to derive this blob's key
    pub kdf: KeyDerivationParams,
    /// Fields in record order
    pub fields: Vec<SealedField>,
    /// Authenticates version, KDF params, plain values, and field layout
    pub tag: EncryptedValue,
}

/// Associated data binding a sealed value to its field and blob version
fn field_aad(version: u8, name: &str) -> Vec<u8> {
    let mut aad = vec![version];
    aad.extend_from_slice(name.as_bytes());
    aad
}

/// Canonical bytes the record-level tag authenticates: version, KDF params,
/// and for every field its kind and name, plus the serialized value for
/// plain fields. Sealed values carry their own tags and are bound to their
/// names through [`field_aad`], so their ciphertexts are not repeated here.
fn record_aad(
    version: u8,
    kdf: &KeyDerivationParams,
    fields: &[SealedField],
) -> IntakeResult<Vec<u8>> {
    let mut aad = vec![version];
    aad.extend_from_slice(&serde_json::to_vec(kdf)?);
    for field in fields {
        // 0xFF never occurs in UTF-8, so it cannot collide with a name
        match field {
            SealedField::Plain { name, value } => {
                aad.push(0x00);
                aad.extend_from_slice(name.as_bytes());
                aad.push(0xFF);
                aad.extend_from_slice(&serde_json::to_vec(value)?);
                aad.push(0xFF);
            }
            SealedField::Sealed { name, .. } => {
                aad.push(0x01);
                aad.extend_from_slice(name.as_bytes());
                aad.push(0xFF);
            }
        }
    }
    Ok(aad)
}

/// Compute the record-level tag: an AEAD seal of the empty message whose
/// associated data is the canonical record layout
fn record_tag(
    version: u8,
    kdf: &KeyDerivationParams,
    fields: &[SealedField],
    key: &DerivedKey,
) -> IntakeResult<EncryptedValue> {
    encrypt(b"", key, &record_aad(version, kdf, fields)?)
}

/// Encrypt the sensitive fields of a validated record.
///
/// The derived key lives only for the duration of the call.
pub fn seal(
    record: &IntakeRecord,
    secret: &SecureString,
    schema: &IntakeSchema,
) -> IntakeResult<EncryptedRecord> {
    let kdf = KeyDerivationParams::generate();
    let key = derive_key(secret.as_str(), &kdf)?;

    let mut fields = Vec::with_capacity(record.len());
    for field in record.iter() {
        // Fields missing from the schema are treated as sensitive: when in
        // doubt, encrypt.
        let sensitive = schema
            .field(&field.name)
            .map(|s| s.sensitive)
            .unwrap_or(true);

        if sensitive {
            let plaintext = serde_json::to_vec(&field.value)?;
            let data = encrypt(&plaintext, &key, &field_aad(SCHEMA_VERSION, &field.name))?;
            fields.push(SealedField::Sealed {
                name: field.name.clone(),
                data,
            });
        } else {
            fields.push(SealedField::Plain {
                name: field.name.clone(),
                value: field.value.clone(),
            });
        }
    }

    let tag = record_tag(SCHEMA_VERSION, &kdf, &fields, &key)?;

    Ok(EncryptedRecord {
        version: SCHEMA_VERSION,
        kdf,
        fields,
        tag,
    })
}

/// Decrypt an encrypted record back into a validated record.
///
/// Fails with [`IntakeError::SchemaVersion`] before touching any key material
/// if the blob layout is unrecognized, and with
/// [`IntakeError::Authentication`] on a wrong secret or any tampering: a
/// flipped ciphertext, a rewritten plain value, or fields swapped, renamed,
/// reordered, added, or removed. Never returns a record built from partially
/// verified data.
pub fn unseal(blob: &EncryptedRecord, secret: &SecureString) -> IntakeResult<IntakeRecord> {
    if blob.version != SCHEMA_VERSION {
        return Err(IntakeError::SchemaVersion {
            found: blob.version,
            supported: SCHEMA_VERSION,
        });
    }

    let key = derive_key(secret.as_str(), &blob.kdf)?;

    // Verify the record-level tag before decrypting any field: the plain
    // values and the field layout must be exactly as sealed.
    decrypt(
        &blob.tag,
        &key,
        &record_aad(blob.version, &blob.kdf, &blob.fields)?,
    )?;

    let mut fields = Vec::with_capacity(blob.fields.len());
    for field in &blob.fields {
        let (name, value) = match field {
            SealedField::Plain { name, value } => (name.clone(), value.clone()),
            SealedField::Sealed { name, data } => {
                let plaintext = decrypt(data, &key, &field_aad(blob.version, name))?;
                let value: FieldValue = serde_json::from_slice(&plaintext).map_err(|e| {
                    IntakeError::Authentication(format!("Decrypted field is malformed: {}", e))
                })?;
                (name.clone(), value)
            }
        };
        fields.push(RecordField { name, value });
    }

    Ok(IntakeRecord::from_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_as_of, RawInput};
    use chrono::NaiveDate;

    fn schema() -> IntakeSchema {
        IntakeSchema::client_intake()
    }

    fn sample_record(schema: &IntakeSchema) -> IntakeRecord {
        let pairs = [
            ("full_name", "Jordan Avery"),
            ("dob", "03/14/1975"),
            ("ssn", "856-45-6789"),
            ("citizenship", "US Citizen"),
            ("residential_address", "12 Harbor Lane"),
            ("mobile_phone", "6035550142"),
            ("employment_status", "Unemployed"),
            ("spouse_applicable", "Yes"),
            ("spouse_full_name", "Casey Avery"),
            ("spouse_ssn", "856456789"),
            ("electronic_delivery_consent", "Yes"),
        ];
        let raw: RawInput = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        validate_as_of(&raw, schema, today)
            .into_record()
            .expect("sample input must validate")
    }

    #[test]
    fn test_round_trip_law() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("correct horse battery staple");

        let blob = seal(&record, &secret, &schema).unwrap();
        let restored = unseal(&blob, &secret).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_wrong_secret_is_authentication_failure() {
        let schema = schema();
        let record = sample_record(&schema);

        let blob = seal(&record, &SecureString::new("right secret"), &schema).unwrap();
        let err = unseal(&blob, &SecureString::new("wrong secret")).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_unknown_version_fails_before_decryption() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        blob.version = 9;

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(matches!(
            err,
            IntakeError::SchemaVersion {
                found: 9,
                supported: SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn test_sensitive_fields_are_sealed_others_plain() {
        let schema = schema();
        let record = sample_record(&schema);
        let blob = seal(&record, &SecureString::new("secret"), &schema).unwrap();

        for field in &blob.fields {
            let sensitive = schema.field(field.name()).unwrap().sensitive;
            match field {
                SealedField::Sealed { .. } => {
                    assert!(sensitive, "{} should be sealed", field.name())
                }
                SealedField::Plain { .. } => {
                    assert!(!sensitive, "{} should be plain", field.name())
                }
            }
        }
    }

    #[test]
    fn test_serialized_blob_never_contains_sensitive_plaintext() {
        let schema = schema();
        let record = sample_record(&schema);
        let blob = seal(&record, &SecureString::new("secret"), &schema).unwrap();

        let json = serde_json::to_string(&blob).unwrap();
        // Both SSNs normalize to the same 9 digits
        assert!(!json.contains("856456789"));
        // Non-sensitive fields remain inspectable
        assert!(json.contains("Jordan Avery"));
        assert!(json.contains("Unemployed"));
    }

    #[test]
    fn test_equal_sensitive_plaintexts_get_distinct_ciphertexts() {
        let schema = schema();
        // ssn and spouse_ssn hold the identical digit string in the sample
        let record = sample_record(&schema);
        let blob = seal(&record, &SecureString::new("secret"), &schema).unwrap();

        let sealed: Vec<&EncryptedValue> = blob
            .fields
            .iter()
            .filter_map(|f| match f {
                SealedField::Sealed { name, data } if name == "ssn" || name == "spouse_ssn" => {
                    Some(data)
                }
                _ => None,
            })
            .collect();
        assert_eq!(sealed.len(), 2);
        assert_ne!(sealed[0].nonce, sealed[1].nonce);
        assert_ne!(sealed[0].ciphertext, sealed[1].ciphertext);
    }

    #[test]
    fn test_reseal_regenerates_salt_and_nonces() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let first = seal(&record, &secret, &schema).unwrap();
        let second = seal(&record, &secret, &schema).unwrap();

        assert_ne!(first.kdf.salt, second.kdf.salt);
        let nonce_of = |blob: &EncryptedRecord| {
            blob.fields
                .iter()
                .find_map(|f| match f {
                    SealedField::Sealed { name, data } if name == "ssn" => Some(data.nonce.clone()),
                    _ => None,
                })
                .unwrap()
        };
        assert_ne!(nonce_of(&first), nonce_of(&second));
    }

    #[test]
    fn test_tampered_field_is_authentication_failure() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        for field in &mut blob.fields {
            if let SealedField::Sealed { data, .. } = field {
                let flipped = if data.ciphertext.starts_with('A') { "B" } else { "A" };
                data.ciphertext.replace_range(0..1, flipped);
            }
        }

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_swapped_ciphertexts_are_authentication_failure() {
        let schema = schema();
        // ssn and spouse_ssn hold the same digits, so a swap that went
        // undetected would decrypt cleanly
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        let index_of = |blob: &EncryptedRecord, wanted: &str| {
            blob.fields
                .iter()
                .position(|f| f.name() == wanted)
                .unwrap()
        };
        let (a, b) = (index_of(&blob, "ssn"), index_of(&blob, "spouse_ssn"));
        let (SealedField::Sealed { data: da, .. }, SealedField::Sealed { data: db, .. }) =
            (blob.fields[a].clone(), blob.fields[b].clone())
        else {
            panic!("ssn fields must be sealed");
        };
        match &mut blob.fields[a] {
            SealedField::Sealed { data, .. } => *data = db,
            _ => unreachable!(),
        }
        match &mut blob.fields[b] {
            SealedField::Sealed { data, .. } => *data = da,
            _ => unreachable!(),
        }

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_rewritten_plain_field_is_authentication_failure() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        for field in &mut blob.fields {
            if let SealedField::Plain { name, value } = field {
                if name == "employment_status" {
                    *value = FieldValue::Choice("Astronaut".to_string());
                }
            }
        }

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_dropped_field_is_authentication_failure() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        blob.fields.retain(|f| f.name() != "electronic_delivery_consent");

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_reordered_fields_are_authentication_failure() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let mut blob = seal(&record, &secret, &schema).unwrap();
        blob.fields.reverse();

        let err = unseal(&blob, &secret).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn test_blob_serde_round_trip() {
        let schema = schema();
        let record = sample_record(&schema);
        let secret = SecureString::new("secret");

        let blob = seal(&record, &secret, &schema).unwrap();
        let json = serde_json::to_string_pretty(&blob).unwrap();
        let back: EncryptedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(unseal(&back, &secret).unwrap(), record);
    }
}

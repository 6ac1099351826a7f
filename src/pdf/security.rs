//! PDF Standard Security Handler (ISO 32000-1 §7.6.3)
//!
//! Password protection and permission bits for generated reports, using the
//! revision 3 handler with 128-bit RC4. The document password is independent
//! of the data-encryption secret; it only gates opening and printing the
//! rendered PDF.
//!
//! Algorithm numbers in comments refer to ISO 32000-1: Algorithm 2 (file
//! key), Algorithm 3 (/O), Algorithm 5 (/U), and §7.6.2 (per-object keys).

use lopdf::{dictionary, Document, Object, StringFormat};
use md5::{Digest, Md5};
use rc4::{consts::U16, KeyInit, Rc4, StreamCipher};

use crate::error::{IntakeError, IntakeResult};

/// Standard padding string applied to short passwords
const PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// Key length in bytes (128-bit, /Length 128, revision 3)
const KEY_LEN: usize = 16;

/// User-access permissions encoded into the /P entry
#[derive(Debug, Clone, Copy)]
pub struct Permissions {
    /// Allow printing (bits 3 and 12)
    pub print: bool,
    /// Allow content modification (bits 4 and 11)
    pub modify: bool,
    /// Allow copying text and graphics (bits 5 and 10)
    pub copy: bool,
    /// Allow annotations and form fill-in (bits 6 and 9)
    pub annotate: bool,
}

impl Default for Permissions {
    /// Print-only: the intake report may be printed but not altered
    fn default() -> Self {
        Self {
            print: true,
            modify: false,
            copy: false,
            annotate: false,
        }
    }
}

impl Permissions {
    /// Encode as the signed 32-bit /P value.
    ///
    /// Reserved bits 7-8 and 13-32 are set; bits 1-2 are clear.
    pub fn p_value(&self) -> i32 {
        let mut p: u32 = 0xFFFF_F0C0;
        if self.print {
            p |= (1 << 2) | (1 << 11);
        }
        if self.modify {
            p |= (1 << 3) | (1 << 10);
        }
        if self.copy {
            p |= (1 << 4) | (1 << 9);
        }
        if self.annotate {
            p |= (1 << 5) | (1 << 8);
        }
        p as i32
    }
}

fn rc4_apply(key: &[u8; KEY_LEN], data: &mut [u8]) -> IntakeResult<()> {
    let mut cipher = Rc4::<U16>::new_from_slice(key)
        .map_err(|e| IntakeError::Crypto(format!("RC4 key setup failed: {}", e)))?;
    cipher.apply_keystream(data);
    Ok(())
}

/// Truncate-or-pad a password to the fixed 32-byte form
fn pad_password(password: &str) -> [u8; 32] {
    let bytes = password.as_bytes();
    let n = bytes.len().min(32);
    let mut out = [0u8; 32];
    out[..n].copy_from_slice(&bytes[..n]);
    out[n..].copy_from_slice(&PAD[..32 - n]);
    out
}

/// Algorithm 3: compute the /O entry
fn owner_value(owner_password: &str, user_password: &str) -> IntakeResult<[u8; 32]> {
    let mut digest: [u8; 16] = Md5::digest(pad_password(owner_password)).into();
    for _ in 0..50 {
        digest = Md5::digest(digest).into();
    }

    let mut out = pad_password(user_password);
    rc4_apply(&digest, &mut out)?;
    for i in 1..=19u8 {
        let mut round_key = digest;
        for b in &mut round_key {
            *b ^= i;
        }
        rc4_apply(&round_key, &mut out)?;
    }
    Ok(out)
}

/// Algorithm 2: derive the file encryption key from the user password
fn file_key(user_password: &str, o: &[u8; 32], p: i32, file_id: &[u8; 16]) -> [u8; KEY_LEN] {
    let mut hasher = Md5::new();
    hasher.update(pad_password(user_password));
    hasher.update(o);
    hasher.update(p.to_le_bytes());
    hasher.update(file_id);
    let mut digest: [u8; 16] = hasher.finalize().into();
    for _ in 0..50 {
        digest = Md5::digest(digest).into();
    }
    digest
}

/// Algorithm 5: compute the /U entry
fn user_value(key: &[u8; KEY_LEN], file_id: &[u8; 16]) -> IntakeResult<[u8; 32]> {
    let mut hasher = Md5::new();
    hasher.update(PAD);
    hasher.update(file_id);
    let mut buf: [u8; 16] = hasher.finalize().into();

    rc4_apply(key, &mut buf)?;
    for i in 1..=19u8 {
        let mut round_key = *key;
        for b in &mut round_key {
            *b ^= i;
        }
        rc4_apply(&round_key, &mut buf)?;
    }

    let mut out = [0u8; 32];
    out[..16].copy_from_slice(&buf);
    Ok(out)
}

/// §7.6.2: per-object key from the file key and the object number
fn object_key(key: &[u8; KEY_LEN], id: lopdf::ObjectId) -> [u8; KEY_LEN] {
    let mut hasher = Md5::new();
    hasher.update(key);
    hasher.update(&id.0.to_le_bytes()[..3]);
    hasher.update(&id.1.to_le_bytes()[..2]);
    hasher.finalize().into()
}

/// Encrypt every string and stream in an object tree in place
fn encrypt_object(obj: &mut Object, key: &[u8; KEY_LEN]) -> IntakeResult<()> {
    match obj {
        Object::String(bytes, _) => rc4_apply(key, bytes)?,
        Object::Array(items) => {
            for item in items {
                encrypt_object(item, key)?;
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                encrypt_object(value, key)?;
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                encrypt_object(value, key)?;
            }
            rc4_apply(key, &mut stream.content)?;
        }
        _ => {}
    }
    Ok(())
}

/// Apply the standard security handler to a finished document.
///
/// The same password serves as user and owner password; `permissions`
/// controls what a conforming reader allows after opening. Must be called
/// after all content objects exist and before saving.
pub fn encrypt_document(
    doc: &mut Document,
    password: &str,
    permissions: Permissions,
    file_id: &[u8; 16],
) -> IntakeResult<()> {
    let p = permissions.p_value();
    let o = owner_value(password, password)?;
    let key = file_key(password, &o, p, file_id);
    let u = user_value(&key, file_id)?;

    // Every existing object gets its strings and streams encrypted under
    // its own derived key. The Encrypt dictionary is added afterwards and
    // therefore stays in the clear, as required.
    for (&id, obj) in doc.objects.iter_mut() {
        let obj_key = object_key(&key, id);
        encrypt_object(obj, &obj_key)?;
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 2,
        "R" => 3,
        "Length" => 128,
        "P" => p as i64,
        "O" => Object::String(o.to_vec(), StringFormat::Hexadecimal),
        "U" => Object::String(u.to_vec(), StringFormat::Hexadecimal),
    });

    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(file_id.to_vec(), StringFormat::Hexadecimal),
            Object::String(file_id.to_vec(), StringFormat::Hexadecimal),
        ]),
    );

    Ok(())
}

//! Persistence for encrypted records
//!
//! Atomic writes (temp file in the same directory, fsync, rename) so a crash
//! never leaves a corrupt or partial blob at the final path. On unix the
//! stored file is restricted to owner read/write. Secure deletion overwrites
//! the file with random bytes before unlinking it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use crate::error::{IntakeError, IntakeResult};

use super::record::EncryptedRecord;

/// Number of random overwrite passes before unlinking
const SHRED_PASSES: usize = 3;

/// Load an encrypted record blob from disk
pub fn load(path: impl AsRef<Path>) -> IntakeResult<EncryptedRecord> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IntakeError::Storage(format!(
            "Record file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| IntakeError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| IntakeError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write an encrypted record blob atomically
///
/// The blob is fully written and synced to a temp file first, then renamed
/// over the target. Replaces any previous blob at the path.
pub fn save(path: impl AsRef<Path>, record: &EncryptedRecord) -> IntakeResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                IntakeError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    // Temp file in the same directory so the rename stays atomic
    let temp_path = path.with_extension("rec.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| IntakeError::Storage(format!("Failed to create temp file: {}", e)))?;

    restrict_permissions(&file)?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record)
        .map_err(|e| IntakeError::Storage(format!("Failed to serialize record: {}", e)))?;

    writer
        .flush()
        .map_err(|e| IntakeError::Storage(format!("Failed to flush record: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| IntakeError::Storage(format!("Failed to sync record: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        IntakeError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Overwrite a file with random data and delete it
///
/// Missing files are treated as already deleted.
pub fn secure_delete(path: impl AsRef<Path>) -> IntakeResult<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(());
    }

    let len = fs::metadata(path)
        .map_err(|e| IntakeError::Storage(format!("Failed to stat {}: {}", path.display(), e)))?
        .len() as usize;

    if len > 0 {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| IntakeError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut noise = vec![0u8; len];
        for _ in 0..SHRED_PASSES {
            OsRng.fill_bytes(&mut noise);
            file.seek(SeekFrom::Start(0))
                .map_err(|e| IntakeError::Storage(format!("Failed to seek: {}", e)))?;
            file.write_all(&noise)
                .map_err(|e| IntakeError::Storage(format!("Failed to overwrite: {}", e)))?;
            file.sync_all()
                .map_err(|e| IntakeError::Storage(format!("Failed to sync: {}", e)))?;
        }
    }

    fs::remove_file(path)
        .map_err(|e| IntakeError::Storage(format!("Failed to remove {}: {}", path.display(), e)))
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> IntakeResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let perms = fs::Permissions::from_mode(0o600);
    file.set_permissions(perms)
        .map_err(|e| IntakeError::Storage(format!("Failed to set permissions: {}", e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> IntakeResult<()> {
    Ok(())
}

//! CLI command handlers
//!
//! Bridges clap argument parsing with the pipeline: validate raw input,
//! seal/unseal encrypted records, render reports, shred stored blobs, and
//! inspect the audit log. Secrets come from an environment variable when set
//! (for scripting) or a hidden terminal prompt otherwise.

use std::path::PathBuf;

use clap::Subcommand;

use crate::audit::{AuditEntry, AuditLogger, Operation};
use crate::crypto::SecureString;
use crate::error::{IntakeError, IntakeResult};
use crate::pdf::{render, DocumentProtection, Permissions, RenderOptions};
use crate::schema::IntakeSchema;
use crate::sealed::{load, save, seal, secure_delete, unseal};
use crate::validation::{validate, RawInput};

/// Intake pipeline commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check raw intake input against the schema and report all violations
    Validate {
        /// Path to a JSON object of field name to raw string value
        input: PathBuf,
    },

    /// Validate raw input and store it as an encrypted record
    Seal {
        /// Path to a JSON object of field name to raw string value
        input: PathBuf,

        /// Destination path for the encrypted record
        #[arg(short, long)]
        output: PathBuf,

        /// Data-encryption secret (prompted when unset)
        #[arg(long, env = "MAGNUS_INTAKE_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Decrypt a stored record and emit its fields as raw JSON input
    Unseal {
        /// Path to the encrypted record
        input: PathBuf,

        /// Write the decrypted fields here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Data-encryption secret (prompted when unset)
        #[arg(long, env = "MAGNUS_INTAKE_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Generate the intake report PDF from a stored record
    Render {
        /// Path to the encrypted record
        input: PathBuf,

        /// Destination path for the PDF
        #[arg(short, long)]
        output: PathBuf,

        /// Data-encryption secret (prompted when unset)
        #[arg(long, env = "MAGNUS_INTAKE_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Protect the PDF with an open password
        #[arg(long)]
        protect: bool,

        /// Document password (prompted when --protect is set and this is unset)
        #[arg(long, env = "MAGNUS_INTAKE_DOC_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Allow copying text from the protected document
        #[arg(long)]
        allow_copy: bool,

        /// Allow modifying the protected document
        #[arg(long)]
        allow_modify: bool,

        /// Allow annotating the protected document
        #[arg(long)]
        allow_annotate: bool,

        /// Disallow printing the protected document
        #[arg(long)]
        no_print: bool,
    },

    /// Overwrite a stored record with random data and delete it
    Shred {
        /// Path to the encrypted record
        path: PathBuf,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Dispatch a command.
///
/// Returns `Ok(false)` when validation found violations: the run completed
/// but the input did not pass. Every outcome is recorded in the audit log.
pub fn handle_command(command: Commands, logger: &AuditLogger) -> IntakeResult<bool> {
    match command {
        Commands::Validate { input } => handle_validate(input, logger),
        Commands::Seal {
            input,
            output,
            secret,
        } => handle_seal(input, output, secret, logger).map(|_| true),
        Commands::Unseal {
            input,
            output,
            secret,
        } => handle_unseal(input, output, secret, logger).map(|_| true),
        Commands::Render {
            input,
            output,
            secret,
            protect,
            password,
            allow_copy,
            allow_modify,
            allow_annotate,
            no_print,
        } => {
            let permissions = Permissions {
                print: !no_print,
                modify: allow_modify,
                copy: allow_copy,
                annotate: allow_annotate,
            };
            handle_render(input, output, secret, protect, password, permissions, logger)
                .map(|_| true)
        }
        Commands::Shred { path } => handle_shred(path, logger).map(|_| true),
        Commands::Audit { limit } => handle_audit(limit, logger).map(|_| true),
    }
}

fn handle_validate(input: PathBuf, logger: &AuditLogger) -> IntakeResult<bool> {
    let raw = read_raw_input(&input)?;
    let schema = IntakeSchema::client_intake();
    let result = validate(&raw, &schema);

    let violations = result.violations();
    logger.log(&AuditEntry::success(
        Operation::Validated,
        Some(input.display().to_string()),
        Some(format!("{} violations", violations.len())),
    ))?;

    if result.is_valid() {
        println!("Input is valid.");
        Ok(true)
    } else {
        println!("Input has {} violation(s):", violations.len());
        for v in violations {
            println!("  {}: {}", v.field, v.reason);
        }
        Ok(false)
    }
}

fn handle_seal(
    input: PathBuf,
    output: PathBuf,
    secret: Option<String>,
    logger: &AuditLogger,
) -> IntakeResult<()> {
    let raw = read_raw_input(&input)?;
    let schema = IntakeSchema::client_intake();

    let record = match validate(&raw, &schema) {
        result if result.is_valid() => result.into_record().ok_or_else(|| {
            IntakeError::Storage("Validation produced no record".to_string())
        })?,
        result => {
            let violations = result.violations();
            logger.log(&AuditEntry::failure(
                Operation::Sealed,
                Some(output.display().to_string()),
                Some(format!("{} violations", violations.len())),
            ))?;
            println!("Input has {} violation(s):", violations.len());
            for v in violations {
                println!("  {}: {}", v.field, v.reason);
            }
            return Err(IntakeError::Storage(
                "Cannot seal: input did not validate".to_string(),
            ));
        }
    };

    let secret = resolve_secret(secret, "Enter data-encryption secret: ")?;
    let field_count = record.len();

    let blob = log_on_failure(
        seal(&record, &secret, &schema),
        Operation::Sealed,
        &output,
        logger,
    )?;
    log_on_failure(save(&output, &blob), Operation::Sealed, &output, logger)?;

    logger.log(&AuditEntry::success(
        Operation::Sealed,
        Some(output.display().to_string()),
        Some(format!("{} fields", field_count)),
    ))?;

    println!("Sealed {} fields to {}", field_count, output.display());
    Ok(())
}

fn handle_unseal(
    input: PathBuf,
    output: Option<PathBuf>,
    secret: Option<String>,
    logger: &AuditLogger,
) -> IntakeResult<()> {
    let blob = log_on_failure(load(&input), Operation::Unsealed, &input, logger)?;
    let secret = resolve_secret(secret, "Enter data-encryption secret: ")?;

    let record = log_on_failure(unseal(&blob, &secret), Operation::Unsealed, &input, logger)?;

    let raw: RawInput = record
        .iter()
        .map(|f| (f.name.clone(), f.value.to_string()))
        .collect();
    let json = serde_json::to_string_pretty(&raw)?;

    match &output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| IntakeError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
            println!("Unsealed {} fields to {}", record.len(), path.display());
        }
        None => println!("{}", json),
    }

    logger.log(&AuditEntry::success(
        Operation::Unsealed,
        Some(input.display().to_string()),
        Some(format!("{} fields", record.len())),
    ))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_render(
    input: PathBuf,
    output: PathBuf,
    secret: Option<String>,
    protect: bool,
    password: Option<String>,
    permissions: Permissions,
    logger: &AuditLogger,
) -> IntakeResult<()> {
    let blob = log_on_failure(load(&input), Operation::Rendered, &output, logger)?;
    let secret = resolve_secret(secret, "Enter data-encryption secret: ")?;
    let record = log_on_failure(unseal(&blob, &secret), Operation::Rendered, &output, logger)?;

    let protection = if protect {
        let password = match password {
            Some(p) => SecureString::new(p),
            None => prompt_new_password()?,
        };
        Some(DocumentProtection {
            password,
            permissions,
        })
    } else {
        None
    };

    let schema = IntakeSchema::client_intake();
    let options = RenderOptions {
        protection,
        timestamp: None,
    };
    let doc = log_on_failure(
        render(&record, &schema, &options),
        Operation::Rendered,
        &output,
        logger,
    )?;
    log_on_failure(doc.write_to(&output), Operation::Rendered, &output, logger)?;

    logger.log(&AuditEntry::success(
        Operation::Rendered,
        Some(output.display().to_string()),
        Some(format!("{} pages", doc.page_count())),
    ))?;

    println!(
        "Rendered {} page(s) to {}{}",
        doc.page_count(),
        output.display(),
        if protect { " (password protected)" } else { "" }
    );
    Ok(())
}

fn handle_shred(path: PathBuf, logger: &AuditLogger) -> IntakeResult<()> {
    log_on_failure(secure_delete(&path), Operation::Shredded, &path, logger)?;

    logger.log(&AuditEntry::success(
        Operation::Shredded,
        Some(path.display().to_string()),
        None,
    ))?;

    println!("Shredded {}", path.display());
    Ok(())
}

fn handle_audit(limit: usize, logger: &AuditLogger) -> IntakeResult<()> {
    let entries = logger.read_recent(limit)?;

    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

/// Read the raw input map from a JSON file
fn read_raw_input(path: &PathBuf) -> IntakeResult<RawInput> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| IntakeError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| IntakeError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Take the secret from the CLI/environment or prompt for it
fn resolve_secret(secret: Option<String>, prompt: &str) -> IntakeResult<SecureString> {
    match secret {
        Some(s) => Ok(SecureString::new(s)),
        None => {
            let s = rpassword::prompt_password(prompt)
                .map_err(|e| IntakeError::Io(format!("Failed to read secret: {}", e)))?;
            Ok(SecureString::new(s))
        }
    }
}

/// Prompt for a new document password with confirmation
fn prompt_new_password() -> IntakeResult<SecureString> {
    loop {
        let pass1 = rpassword::prompt_password("Enter document password: ")
            .map_err(|e| IntakeError::Io(format!("Failed to read password: {}", e)))?;

        if pass1.is_empty() {
            println!("Password must not be empty. Please try again.");
            continue;
        }

        let pass2 = rpassword::prompt_password("Confirm document password: ")
            .map_err(|e| IntakeError::Io(format!("Failed to read password: {}", e)))?;

        if pass1 != pass2 {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(SecureString::new(pass1));
    }
}

/// Run a step, logging a failure entry (error category only) before bubbling
fn log_on_failure<T>(
    result: IntakeResult<T>,
    operation: Operation,
    target: &PathBuf,
    logger: &AuditLogger,
) -> IntakeResult<T> {
    result.map_err(|e| {
        let _ = logger.log(&AuditEntry::failure(
            operation,
            Some(target.display().to_string()),
            Some(error_category(&e).to_string()),
        ));
        e
    })
}

/// Error category for audit entries; never includes the error contents
fn error_category(err: &IntakeError) -> &'static str {
    match err {
        IntakeError::Authentication(_) => "authentication",
        IntakeError::SchemaVersion { .. } => "schema_version",
        IntakeError::Render(_) => "render",
        IntakeError::Crypto(_) => "crypto",
        IntakeError::Storage(_) => "storage",
        IntakeError::Io(_) => "io",
        IntakeError::Json(_) => "json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_names() {
        assert_eq!(
            error_category(&IntakeError::Authentication("x".into())),
            "authentication"
        );
        assert_eq!(
            error_category(&IntakeError::SchemaVersion {
                found: 9,
                supported: 1
            }),
            "schema_version"
        );
        assert_eq!(error_category(&IntakeError::Storage("x".into())), "storage");
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use magnus_intake::audit::AuditLogger;
use magnus_intake::cli::{handle_command, Commands};

#[derive(Parser)]
#[command(
    name = "magnus-intake",
    version,
    about = "Client intake pipeline: validate, encrypt, and report",
    long_about = "Magnus Intake processes new-client intake forms: it validates \
                  raw input against the firm's intake schema, stores validated \
                  records encrypted at rest, and generates the intake report PDF \
                  with optional password protection."
)]
struct Cli {
    /// Path to the append-only audit log
    #[arg(
        long,
        global = true,
        env = "MAGNUS_INTAKE_AUDIT_LOG",
        default_value = "intake-audit.log"
    )]
    audit_log: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = AuditLogger::new(cli.audit_log);
    let clean = handle_command(cli.command, &logger)?;

    if !clean {
        // Validation violations are a normal outcome, but scripts need the
        // nonzero exit
        std::process::exit(1);
    }

    Ok(())
}

// meterbill CLI - printer counter billing reconciliation

mod exit_codes;
mod history;
mod reconcile;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use meterbill_cli::session::{AppState, SessionError};
use meterbill_config::Settings;
use meterbill_io::IoError;
use meterbill_recon::{Pricing, ReconError};

use exit_codes::{
    io_exit_code, session_exit_code, EXIT_ERROR, EXIT_IO, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
};
use history::HistoryCommands;

#[derive(Parser)]
#[command(name = "meterbill")]
#[command(about = "Reconcile printer counters from billing invoices against a device inventory")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Directory holding the record history (overrides settings.json)
    #[arg(long, global = true, env = "METERBILL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile an invoice against an inventory workbook
    #[command(after_help = "\
Examples:
  meterbill reconcile --document march.pdf --inventory equipos.xlsx
  meterbill reconcile --document march.pdf --inventory equipos.xlsx --label 'March 2024'
  meterbill reconcile --document tables.json --inventory equipos.xlsx --json
  meterbill reconcile --document march.pdf --inventory equipos.xlsx --xlsx result.xlsx")]
    Reconcile {
        /// Billing document: a PDF invoice or a JSON table document
        #[arg(long)]
        document: PathBuf,

        /// Inventory workbook (xlsx, xls, ods)
        #[arg(long)]
        inventory: PathBuf,

        /// Save the run to history under this label
        #[arg(long)]
        label: Option<String>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the result table as CSV (tab-separated for a .tsv file)
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Also write the result table as an Excel workbook
        #[arg(long, value_name = "FILE")]
        xlsx: Option<PathBuf>,
    },

    /// Inspect and manage saved runs
    #[command(subcommand)]
    History(HistoryCommands),

    /// List byte-identical files among stored artifacts
    Duplicates {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("METERBILL_COMMIT"), ")",
        "\ntarget:  ", env!("METERBILL_TARGET"),
        "\nhistory: history.json + documents/",
    )
}

/// Resolved settings shared by every command.
pub struct Context {
    pub data_dir: PathBuf,
    pub pricing: Pricing,
}

impl Context {
    /// Open the session over the data directory.
    pub fn open_state(&self) -> AppState {
        let (state, warnings) = AppState::open(&self.data_dir, self.pricing);
        if !warnings.is_empty() {
            eprintln!(
                "warning: {} problem(s) reading history in {}",
                warnings.len(),
                self.data_dir.display()
            );
        }
        state
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let settings = Settings::load();
    let ctx = Context {
        data_dir: settings.resolved_data_dir(cli.data_dir.as_deref()),
        pricing: settings.pricing(),
    };
    log::debug!("data dir: {}", ctx.data_dir.display());

    let result = match cli.command {
        Commands::Reconcile {
            document,
            inventory,
            label,
            json,
            csv,
            xlsx,
        } => reconcile::cmd_reconcile(&ctx, document, inventory, label, json, csv, xlsx),
        Commands::History(cmd) => history::cmd_history(&ctx, cmd),
        Commands::Duplicates { json } => history::cmd_duplicates(&ctx, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self { code: EXIT_STORE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a session error with the matching exit code.
    pub fn session(err: SessionError) -> Self {
        let code = session_exit_code(&err);
        let hint = match &err {
            SessionError::Io(e) => io_hint(e),
            SessionError::Recon(ReconError::MissingColumn { .. }) => Some(
                "sheets with an 'S/N' column must also have 'Organismo' and 'Ubicación exacta'"
                    .to_string(),
            ),
            SessionError::Input(_) | SessionError::Recon(_) | SessionError::Store(_) => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn from_io(err: IoError) -> Self {
        let hint = io_hint(&err);
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn io_hint(err: &IoError) -> Option<String> {
    match err {
        IoError::PdfToolMissing => {
            Some("Install with: apt install poppler-utils / brew install poppler".to_string())
        }
        IoError::PdfNoText => {
            Some("extract the tables with another tool and pass them as JSON".to_string())
        }
        _ => None,
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        Self::session(err)
    }
}

// ============================================================================
// shared helpers
// ============================================================================

/// Read an input file fully, with the name to record for it.
pub fn read_input(path: &Path) -> Result<(Vec<u8>, String), CliError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((bytes, name))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON encoding failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Run a renderer against locked stdout.
pub fn print_with<F>(render: F) -> Result<(), CliError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    render(&mut handle).map_err(|e| CliError::io(e.to_string()))
}

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use typed_kv::{ConfigError, KvStore, StoreOptions};

/// CLI-specific errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Library error
    #[error(transparent)]
    Library(#[from] typed_kv::Error),

    /// Options file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value given on the command line is not JSON
    #[error("invalid JSON value: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Log filter could not be parsed
    #[error("invalid log filter: {0}")]
    Logging(String),
}

#[derive(Parser)]
#[command(name = "typed-kv")]
#[command(about = "Inspect and edit a typed-kv store file with JSON values")]
struct Cli {
    /// TOML file with store options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bucket to use (overrides the options file)
    #[arg(long)]
    bucket: Option<String>,

    /// Log filter, e.g. "debug" or "typed_kv=trace"
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Store file (created if missing)
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a JSON value at a key
    Set {
        key: String,

        /// JSON text, e.g. '{"name": "Dante", "height": 5.4}'
        value: String,
    },

    /// Print the value stored at a key
    Get { key: String },

    /// List all keys in order
    Keys,

    /// Print every entry as one JSON object per line
    Dump,

    /// Remove a key (succeeds if it is already gone)
    Delete { key: String },

    /// Print the number of entries
    Count,
}

/// Format an error for user-friendly display
fn format_error(err: &AppError) -> String {
    use std::io::IsTerminal;

    let use_colors = std::io::stderr().is_terminal();

    let (red, yellow, reset) = if use_colors {
        ("\x1b[0;31m", "\x1b[0;33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = format!("{}Error:{} {}\n", red, reset, err);

    if let Some(hint) = get_error_hint(err) {
        output.push_str(&format!("{}Hint:{} {}\n", yellow, reset, hint));
    }

    output
}

/// Get a helpful hint for common errors
fn get_error_hint(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Library(typed_kv::Error::NoSuchKey { .. }) => {
            Some("Use 'typed-kv <PATH> keys' to see available keys")
        }
        AppError::Library(typed_kv::Error::Open { .. }) => {
            Some("Check that the file is not open in another process and is a typed-kv store")
        }
        AppError::Library(typed_kv::Error::Deserialization { .. }) => {
            Some("The stored value is not valid JSON; it was probably written by another tool")
        }
        AppError::InvalidJson(_) => Some("Quote strings as JSON, e.g. '\"world\"'"),
        _ => None,
    }
}

fn init_logging(filter: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter).map_err(|e| AppError::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprint!("{}", format_error(&err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    init_logging(&cli.log_level)?;

    let mut options = match &cli.config {
        Some(path) => StoreOptions::from_file(path)?,
        None => StoreOptions::default(),
    };
    if let Some(bucket) = cli.bucket {
        options = options.bucket(bucket);
    }

    let store = KvStore::open_with_options(&cli.path, options)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Set { key, value } => {
            let value: serde_json::Value =
                serde_json::from_str(&value).map_err(AppError::InvalidJson)?;
            store.set(&key, &value)?;
        }
        Commands::Get { key } => {
            let value: serde_json::Value = store.get(&key)?;
            writeln!(out, "{}", value)?;
        }
        Commands::Keys => {
            for key in store.keys()? {
                writeln!(out, "{}", key)?;
            }
        }
        Commands::Dump => {
            store.get_all(|key, value: serde_json::Value| -> Result<(), AppError> {
                writeln!(out, "{}", serde_json::json!({ "key": key, "value": value }))?;
                Ok(())
            })?;
        }
        Commands::Delete { key } => {
            store.delete(&key)?;
        }
        Commands::Count => {
            writeln!(out, "{}", store.len()?)?;
        }
    }

    store.close();
    Ok(())
}

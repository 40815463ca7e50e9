// file: src/main.rs
// description: commandline entry point for inspecting and editing a flash store
// reference: application bootstrap and command handling

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use flash_persist::utils::logging::{self, format_error, format_success, format_value};
use flash_persist::{Config, Encode, FlashStore, HostFs, Validator, open_host_store};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "flash_persist")]
#[command(version = "0.1.0")]
#[command(about = "Read and write typed values on a flash partition", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    /// Host directory to use as the partition, overriding the config file
    #[arg(long, value_name = "DIR", env = "FLASH_PERSIST_ROOT")]
    root: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check chip and partition configuration
    Check,

    /// Print the size of a file in bytes
    Size { path: String },

    /// Read a file and print it decoded as the given kind
    Get {
        path: String,

        #[arg(short, long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },

    /// Write a value to a file using the canonical encoding of its kind
    Set {
        path: String,

        value: String,

        #[arg(short, long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },

    /// Add a value to the end of a file without a separator
    Append {
        path: String,

        value: String,

        #[arg(short, long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },

    /// List files on the partition
    Ls,

    /// Remove a file
    Rm { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = if cli.config.exists() {
        Some(Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?)
    } else {
        None
    };
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_else(Config::default_config);

    logging::init_logger(
        cli.color && config.logging.color,
        cli.verbose || config.logging.verbose,
    );

    if !found {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
    }

    if let Some(root) = cli.root {
        config.storage.root = root;
    }
    info!("Using partition at {}", config.storage.root.display());

    let mut store = open_host_store(&config);

    match cli.command {
        Commands::Check => cmd_check(&mut store)?,
        Commands::Size { path } => cmd_size(&mut store, &path)?,
        Commands::Get { path, kind } => cmd_get(&mut store, &path, kind)?,
        Commands::Set { path, value, kind } => cmd_set(&mut store, &path, &value, kind, false)?,
        Commands::Append { path, value, kind } => {
            cmd_set(&mut store, &path, &value, kind, true)?
        }
        Commands::Ls => cmd_ls(&mut store)?,
        Commands::Rm { path } => cmd_rm(&mut store, &path)?,
    }

    Ok(())
}

fn flash_path(raw: &str) -> String {
    Validator::sanitize_flash_path(raw)
}

fn cmd_check(store: &mut FlashStore<HostFs>) -> Result<()> {
    if !store.check_flash_config() {
        println!("{}", format_error("Flash configuration is invalid"));
        bail!("flash configuration check failed");
    }

    let usage = store.info()?;
    println!(
        "{}",
        format_success(&format!(
            "Flash configuration ok: {} of {} bytes used ({} free)",
            usage.used_bytes,
            usage.total_bytes,
            usage.free_bytes()
        ))
    );
    Ok(())
}

fn cmd_size(store: &mut FlashStore<HostFs>, raw: &str) -> Result<()> {
    let path = flash_path(raw);
    let size = store
        .file_size(&path)
        .with_context(|| format!("Failed to stat {}", path))?;
    println!("{}", format_value(&path, &size.to_string()));
    Ok(())
}

fn cmd_get(store: &mut FlashStore<HostFs>, raw: &str, kind: Kind) -> Result<()> {
    let path = flash_path(raw);
    let rendered = match kind {
        Kind::Bool => store.read::<bool>(&path)?.to_string(),
        Kind::Int => store.read::<i64>(&path)?.to_string(),
        Kind::Uint => store.read::<u64>(&path)?.to_string(),
        Kind::Float => store.read::<f64>(&path)?.to_string(),
        Kind::String => store.read::<String>(&path)?,
        Kind::Json => serde_json::to_string_pretty(&store.read::<Value>(&path)?)?,
    };
    println!("{}", format_value(&path, &rendered));
    Ok(())
}

fn put<T: Encode + ?Sized>(
    store: &mut FlashStore<HostFs>,
    path: &str,
    value: &T,
    append: bool,
) -> flash_persist::Result<()> {
    if append {
        store.append(path, value)
    } else {
        store.write(path, value)
    }
}

fn cmd_set(
    store: &mut FlashStore<HostFs>,
    raw: &str,
    value: &str,
    kind: Kind,
    append: bool,
) -> Result<()> {
    let path = flash_path(raw);
    match kind {
        Kind::Bool => {
            let flag = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                other => bail!("Not a boolean: {}", other),
            };
            put(store, &path, &flag, append)?;
        }
        Kind::Int => {
            let number: i64 = value
                .trim()
                .parse()
                .with_context(|| format!("Not a signed integer: {}", value))?;
            put(store, &path, &number, append)?;
        }
        Kind::Uint => {
            let number: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("Not an unsigned integer: {}", value))?;
            put(store, &path, &number, append)?;
        }
        Kind::Float => {
            let number: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Not a number: {}", value))?;
            put(store, &path, &number, append)?;
        }
        Kind::String => put(store, &path, value, append)?,
        Kind::Json => {
            let document: Value =
                serde_json::from_str(value).context("Value is not valid JSON")?;
            put(store, &path, &document, append)?;
        }
    }

    println!(
        "{}",
        format_success(&format!(
            "{} {} to {}",
            if append { "Appended" } else { "Saved" },
            Validator::truncate_text(value, 40),
            path
        ))
    );
    Ok(())
}

fn cmd_ls(store: &mut FlashStore<HostFs>) -> Result<()> {
    let entries = store.list()?;
    if entries.is_empty() {
        println!("(empty)");
    }
    for entry in entries {
        println!("{}", format_value(&entry.path, &format!("{} bytes", entry.size)));
    }
    Ok(())
}

fn cmd_rm(store: &mut FlashStore<HostFs>, raw: &str) -> Result<()> {
    let path = flash_path(raw);
    store
        .remove(&path)
        .with_context(|| format!("Failed to remove {}", path))?;
    println!("{}", format_success(&format!("Removed {}", path)));
    Ok(())
}

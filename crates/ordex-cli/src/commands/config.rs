//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use ordex_core::models::config::SETTING_KEYS;
use ordex_core::{OrdexConfig, Store};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a setting (e.g. "extraction.similarity_threshold")
    Get { key: String },

    /// Set a setting
    Set { key: String, value: String },

    /// Show configuration file path
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_or_default()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { output, force } => init_config(output, force)?,
        ConfigCommand::Get { key } => {
            let config = load_or_default()?;
            match config.get(&key) {
                Some(value) => println!("{}", value),
                None => anyhow::bail!("unknown configuration key: {}\n{}", key, known_keys()),
            }
        }
        ConfigCommand::Set { key, value } => {
            let mut config = load_or_default()?;
            config.set(&key, &value)?;
            let path = config_file();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            config.save(&path)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            let path = config_file();
            println!("Configuration file: {}", path.display());
            if !path.exists() {
                println!("Status: {}", style("not created").yellow());
                println!("Run 'ordex config init' to create it.");
            }
        }
    }
    Ok(())
}

fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordex")
        .join("config.json")
}

fn load_or_default() -> anyhow::Result<OrdexConfig> {
    let path = config_file();
    if path.exists() {
        Ok(OrdexConfig::from_file(&path)?)
    } else {
        Ok(OrdexConfig::default())
    }
}

fn init_config(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file);
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OrdexConfig::default().save(&path)?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

/// Addressable keys, for the error message on a bad `get`.
fn known_keys() -> String {
    let mut keys: Vec<String> = SETTING_KEYS.iter().map(|k| k.to_string()).collect();
    for store in Store::all() {
        keys.push(format!("mailbox.senders.{}", store.key()));
    }
    format!("known keys:\n  {}", keys.join("\n  "))
}

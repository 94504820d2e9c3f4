//! Inspect command - show how a single message routes and extracts.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use ordex_core::models::RawMessage;
use ordex_core::ExtractorRegistry;

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Saved message file
    #[arg(required = true)]
    input: PathBuf,

    /// Print the parsed message instead of the extracted fragment
    #[arg(long)]
    show_message: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let raw = fs::read_to_string(&args.input)?;
    let msg = RawMessage::parse(&raw);

    if args.show_message {
        println!("{}", serde_json::to_string_pretty(&msg)?);
        return Ok(());
    }

    let registry = ExtractorRegistry::from_config(&config);
    let Some(extractor) = registry.route(&msg) else {
        println!(
            "{} No strategy recognizes sender {:?}",
            style("✗").red(),
            msg.sender
        );
        return Ok(());
    };

    println!(
        "{} Routed to {}",
        style("✓").green(),
        style(extractor.store().label()).cyan()
    );

    match extractor.extract(&msg) {
        Some(order) => {
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        None => {
            println!(
                "{} Strategy matched but recovered no order fragment",
                style("ℹ").blue()
            );
        }
    }

    Ok(())
}

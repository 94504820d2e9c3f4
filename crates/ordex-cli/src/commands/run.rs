//! Run command - extract and reconcile orders from saved messages.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use ordex_core::models::RawMessage;
use ordex_core::report::flatten;
use ordex_core::{ExtractorRegistry, Reconciler};

use super::load_config;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Input files or glob pattern (saved .eml messages)
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: the configured one)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// One CSV row per line item
    Csv,
    /// Merged orders as JSON
    Json,
}

/// Outcome of one message file.
enum Outcome {
    Extracted(String),
    NotRecognized,
    NoOrder,
    Failed(String),
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "eml" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching message files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} messages to process",
        style("ℹ").blue(),
        files.len()
    );

    let registry = ExtractorRegistry::from_config(&config);
    let mut reconciler = Reconciler::with_threshold(config.extraction.similarity_threshold);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} messages")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut extracted = 0usize;
    let mut not_recognized: Vec<PathBuf> = Vec::new();
    let mut no_order: Vec<PathBuf> = Vec::new();
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for path in files {
        match process_message(&path, &registry, &mut reconciler) {
            Outcome::Extracted(store) => {
                debug!("extracted fragment from {} ({})", path.display(), store);
                extracted += 1;
            }
            Outcome::NotRecognized => not_recognized.push(path),
            Outcome::NoOrder => no_order.push(path),
            Outcome::Failed(reason) => {
                warn!("failed to read {}: {}", path.display(), reason);
                failed.push((path, reason));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let orders = reconciler.finish();
    let rows = flatten(&orders);

    // Resolve output format: flag, then config, then CSV.
    let format = args.format.unwrap_or_else(|| {
        match config.export.default_format.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    });

    let content = match format {
        OutputFormat::Csv => rows_to_csv(&rows)?,
        OutputFormat::Json => serde_json::to_string_pretty(&orders)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Report written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }

    // Print summary
    println!();
    println!(
        "{} Reconciled {} orders ({} line items) from {} messages in {:?}",
        style("✓").green(),
        orders.len(),
        rows.len(),
        extracted,
        start.elapsed()
    );
    if !not_recognized.is_empty() || !no_order.is_empty() {
        println!(
            "   {} not recognized, {} carried no order",
            style(not_recognized.len()).yellow(),
            style(no_order.len()).yellow()
        );
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Unreadable files:").red());
        for (path, reason) in &failed {
            println!("  - {}: {}", path.display(), reason);
        }
    }

    Ok(())
}

fn process_message(
    path: &Path,
    registry: &ExtractorRegistry,
    reconciler: &mut Reconciler,
) -> Outcome {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let mut msg = RawMessage::parse(&raw);
    attach_sibling_invoices(path, &mut msg);

    let Some(extractor) = registry.route(&msg) else {
        return Outcome::NotRecognized;
    };
    let store = extractor.store().label().to_string();

    match extractor.extract(&msg) {
        Some(order) => {
            reconciler.add(order);
            Outcome::Extracted(store)
        }
        None => Outcome::NoOrder,
    }
}

/// PDF invoices saved next to the message (same file stem) become its
/// attachments.
fn attach_sibling_invoices(path: &Path, msg: &mut RawMessage) {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let sibling = entry.path();
        let ext = sibling.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("pdf") {
            continue;
        }
        let sibling_stem = sibling.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if !sibling_stem.starts_with(stem) {
            continue;
        }
        match fs::read(&sibling) {
            Ok(data) => {
                debug!("attaching {} to {}", sibling.display(), path.display());
                let name = sibling
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice.pdf")
                    .to_string();
                msg.attachments.insert(name, data);
            }
            Err(e) => warn!("cannot read attachment {}: {}", sibling.display(), e),
        }
    }
}

fn rows_to_csv(rows: &[ordex_core::OrderRow]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

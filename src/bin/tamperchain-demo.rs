#![forbid(unsafe_code)]
//! Builds a ledger from the command line, optionally tampers with it, and
//! shows whether validation notices.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tamperchain::blockchain::Ledger;
use tamperchain::cli::{render_chain_table, validity_banner};
use tamperchain::config::{load_config, load_config_from, Config};
use tracing_subscriber::EnvFilter;

const TAMPERED_DATA: &str = "Tampered Data";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payloads to append, one block each. Blank payloads are skipped.
    payloads: Vec<String>,
    /// Config file (defaults to ./tamperchain.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overwrite the data of the block at this position
    #[arg(long)]
    tamper: Option<u64>,
    /// Replacement data used by --tamper
    #[arg(long, default_value = TAMPERED_DATA)]
    tamper_data: String,
    /// Recompute the tampered block's own hash
    #[arg(long)]
    rehash: bool,
    /// After tampering, keep only the first N blocks
    #[arg(long)]
    keep: Option<usize>,
    /// Print the final chain as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    init_tracing(&config);

    let mut ledger = Ledger::with_genesis_timestamp(config.ledger.genesis_timestamp.as_str());
    for payload in cli.payloads.iter().filter(|p| !p.trim().is_empty()) {
        ledger.append_now(payload)?;
    }
    print_ledger(&ledger, &config, "Ledger", cli.json)?;

    if cli.tamper.is_none() && cli.keep.is_none() {
        return Ok(());
    }

    if let Some(position) = cli.tamper {
        ledger.corrupt_block(position, &cli.tamper_data, cli.rehash)?;
        let how = if cli.rehash { "with rehash" } else { "without rehash" };
        println!(
            "{}",
            format!("Tampered with block #{} {}", position, how).bright_magenta()
        );
    }

    if let Some(keep) = cli.keep {
        let kept: Vec<_> = ledger.blocks().iter().take(keep).cloned().collect();
        ledger = Ledger::from_blocks(kept)?;
        println!("{}", format!("Kept the first {} block(s)", ledger.len()).bright_magenta());
    }

    print_ledger(&ledger, &config, "After tampering", cli.json)?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_ledger(
    ledger: &Ledger,
    config: &Config,
    title: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("{}", format!("{} ({} blocks)", title, ledger.len()).bright_cyan().bold());

    if json {
        println!("{}", serde_json::to_string_pretty(ledger)?);
    } else {
        println!("{}", render_chain_table(ledger, config.display.hash_prefix_len));
    }

    let report = ledger.validate();
    let banner = validity_banner(&report);
    if report.is_valid() {
        println!("{}", banner.bright_green().bold());
    } else {
        println!("{}", banner.red().bold());
    }
    Ok(())
}

use anyhow::Context;
use bluekey_lib::constants::DEFAULT_REPORT_FILENAME;
use bluekey_lib::extract_from_file;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Extract plausible device encryption keys and session tokens from a
/// recorded Bluetooth capture (btsnoop binary log or text hex dump).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Capture file to mine (btsnoop_hci.log, .hci, or a text hex dump).
    capture: PathBuf,

    /// Target device identifier (e.g. a MAC address). Accepted for
    /// downstream tooling; extraction itself does not filter by device.
    device: Option<String>,

    /// Where to write the JSON report.
    #[arg(short, long, default_value = DEFAULT_REPORT_FILENAME)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Some(device) = &cli.device {
        info!(device = %device, "target device noted for downstream verification");
    }

    let report = extract_from_file(&cli.capture)
        .with_context(|| format!("extraction failed for {}", cli.capture.display()))?;

    report
        .save_to_file(&cli.output)
        .with_context(|| format!("could not write report to {}", cli.output.display()))?;

    println!("Report written to {}", cli.output.display());
    println!("  32-char key candidates:   {}", report.possible_keys_32.len());
    println!("  64-char token candidates: {}", report.possible_tokens_64.len());
    println!("  envelope messages:        {}", report.envelope_messages.len());

    if report.is_empty() {
        println!("No candidates extracted: the capture decoded but nothing key-shaped was found.");
        return Ok(());
    }

    if !report.possible_keys_32.is_empty() {
        println!("Top key candidates:");
        for (i, key) in report.possible_keys_32.iter().take(3).enumerate() {
            println!("  {}. {}", i + 1, key);
        }
    }
    if !report.possible_tokens_64.is_empty() {
        println!("Top token candidates:");
        for (i, token) in report.possible_tokens_64.iter().take(3).enumerate() {
            println!("  {}. {}...{}", i + 1, &token[..16], &token[token.len() - 16..]);
        }
    }

    Ok(())
}

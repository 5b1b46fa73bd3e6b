//! Interactive CLI for the out-of-band certificate exchange.
//!
//! Runs one side of a handshake in a single process: prints this side's
//! public key block, reads the partner's block pasted on stdin, then
//! either encrypts a certificate file into a pasteable block (`send`) or
//! decrypts a pasted block into a file (`recv`). The certificate file is
//! treated as opaque bytes; no network I/O is performed.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use certrelay::KeyExchangeSession;

#[derive(Parser)]
#[command(name = "certrelay-exchange")]
#[command(about = "Exchange a certificate through pasteable text blocks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a certificate file for the partner
    Send {
        /// Certificate export to send (e.g. a .p12/.pfx file)
        #[arg(long)]
        cert: PathBuf,
    },
    /// Receive a certificate file from the partner
    Recv {
        /// Where to write the decrypted certificate export
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certrelay=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Send { cert } => send(cert),
        Commands::Recv { out } => recv(out),
    }
}

fn send(cert: PathBuf) -> anyhow::Result<()> {
    let payload = std::fs::read(&cert)
        .with_context(|| format!("Failed to read certificate file {}", cert.display()))?;

    let mut session = KeyExchangeSession::new();
    publish("Send this public key block to your partner:", &session.export_public_key())?;

    let partner = read_block("Paste the partner's PUBLIC KEY block, then press Enter twice:")?;
    session
        .derive_shared_secret(&partner)
        .context("Partner public key could not be parsed - ask for a re-send")?;
    info!("Key agreement complete");

    let encrypted = session
        .encrypt(&payload)
        .context("Failed to encrypt certificate")?;
    publish("Send this encrypted block to your partner:", &encrypted)?;
    Ok(())
}

fn recv(out: PathBuf) -> anyhow::Result<()> {
    let mut session = KeyExchangeSession::new();
    publish("Send this public key block to your partner:", &session.export_public_key())?;

    let partner = read_block("Paste the partner's PUBLIC KEY block, then press Enter twice:")?;
    session
        .derive_shared_secret(&partner)
        .context("Partner public key could not be parsed - ask for a re-send")?;
    info!("Key agreement complete");

    let encrypted = read_block("Paste the ENCRYPTED DATA block, then press Enter twice:")?;
    let payload = session
        .decrypt(&encrypted)
        .context("Block could not be decrypted - it may be garbled, ask for a re-send")?;

    std::fs::write(&out, &payload)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Wrote {} bytes to {}", payload.len(), out.display());
    Ok(())
}

fn publish(prompt: &str, block: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n{prompt}\n\n{block}\n")?;
    Ok(())
}

/// Read a pasted block from stdin, terminated by an empty line or EOF.
fn read_block(prompt: &str) -> anyhow::Result<String> {
    println!("{prompt}");
    let mut block = String::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() && !block.trim().is_empty() {
            break;
        }
        block.push_str(&line);
        block.push('\n');
    }
    Ok(block)
}

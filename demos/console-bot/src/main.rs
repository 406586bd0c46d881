//! Console Bot
//!
//! Drives the full Chime runtime from the terminal: each stdin line is a
//! message, and replies and reactions are printed back.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot
//! cargo run --package console-bot -- --guest   # non-public commands denied
//! ```
//!
//! Try `.menu`, `.ping`, `.echo hi`, `.whoami`, `.boom`, `:button alive`,
//! `:image`, `:reply thanks`.

mod console;
mod plugins;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chime::prelude::*;
use chime::runtime::figment::providers::Serialized;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use console::{ConsoleTransport, LineReader};

#[derive(Parser, Debug)]
#[command(name = "console-bot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to chime.toml in the usual places)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identifier you type as
    #[arg(long = "as", default_value = "100@s.whatsapp.net")]
    sender: String,

    /// Display name you type as
    #[arg(long, default_value = "Console User")]
    name: String,

    /// Do not make the sender the owner (non-public commands are denied)
    #[arg(long, env = "CONSOLE_BOT_GUEST")]
    guest: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = ChimeRuntime::builder().transport(Arc::new(ConsoleTransport));
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if !args.guest {
        builder = builder.merge(Serialized::default("bot.owner", &args.sender));
    }
    let runtime = builder.build()?;

    let units: Vec<_> = runtime.plugin_units().iter().map(|p| p.name).collect();
    info!(plugins = ?units, prefix = %runtime.dispatcher().prefix(), "Console bot ready");

    let (tx, rx) = mpsc::channel(32);
    let reader = LineReader::new(args.sender, args.name);
    tokio::spawn(async move {
        if let Err(e) = reader.pump(tx).await {
            error!(error = %e, "Failed to read from stdin");
        }
    });

    runtime.run(rx).await?;
    Ok(())
}

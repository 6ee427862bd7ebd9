use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codec::{CodecConfig, EntityState, PlayerState, ProtocolVariant};
use huffman::HuffmanCodec;
use serde::de::DeserializeOwned;
use tremnet_tools::{
    decode_entity_delta, encode_entity_delta, encode_player_delta, from_hex, huffman_report,
    tables_report, EncodedDelta, LayoutReport,
};

#[derive(Parser)]
#[command(
    name = "tremnet-tools",
    version,
    about = "tremnet codec inspection tools"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print code length statistics of the message Huffman code.
    Huffman,
    /// Print the entity and player field layouts.
    Tables {
        /// Show the legacy protocol layout.
        #[arg(long)]
        legacy: bool,
    },
    /// Encode an entity delta and print its size.
    EntityDelta {
        /// Baseline entity state (JSON).
        #[arg(long)]
        from: Option<PathBuf>,
        /// New entity state (JSON); omit to encode a removal.
        #[arg(long)]
        to: Option<PathBuf>,
        /// Write the entity even if nothing changed.
        #[arg(long)]
        force: bool,
        /// Codec configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Encode a player delta and print its size.
    PlayerDelta {
        /// Baseline player state (JSON).
        #[arg(long)]
        from: Option<PathBuf>,
        /// New player state (JSON).
        #[arg(long)]
        to: PathBuf,
        /// Codec configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode an entity delta from hex and print it as JSON.
    DecodeEntity {
        /// Baseline entity state (JSON).
        #[arg(long)]
        from: Option<PathBuf>,
        /// Encoded delta, entity number included.
        #[arg(long)]
        hex: String,
        /// Codec configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Huffman => {
            let report = huffman_report(HuffmanCodec::shared());
            println!(
                "code lengths: {}..={} bits, expected {:.3} bits/byte",
                report.min_code_length, report.max_code_length, report.expected_bits_per_byte
            );
            for (length, count) in &report.length_histogram {
                println!("  {length:>2} bits: {count} symbols");
            }
        }
        Command::Tables { legacy } => {
            let variant = if legacy {
                ProtocolVariant::Legacy
            } else {
                ProtocolVariant::Current
            };
            let report = tables_report(variant);
            println!("variant: {:?}", report.variant);
            print_layout("entity", &report.entity);
            print_layout("player", &report.player);
        }
        Command::EntityDelta {
            from,
            to,
            force,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let from: Option<EntityState> = from.as_deref().map(load_json).transpose()?;
            let to: Option<EntityState> = to.as_deref().map(load_json).transpose()?;
            let encoded = encode_entity_delta(&config, from.as_ref(), to.as_ref(), force)?;
            print_encoded(&encoded);
        }
        Command::PlayerDelta { from, to, config } => {
            let config = load_config(config.as_deref())?;
            let from: Option<PlayerState> = from.as_deref().map(load_json).transpose()?;
            let to: PlayerState = load_json(&to)?;
            let encoded = encode_player_delta(&config, from.as_ref(), &to)?;
            print_encoded(&encoded);
        }
        Command::DecodeEntity { from, hex, config } => {
            let config = load_config(config.as_deref())?;
            let from: Option<EntityState> = from.as_deref().map(load_json).transpose()?;
            let bytes = from_hex(&hex).context("decode --hex argument")?;
            let (number, update) = decode_entity_delta(&config, from.as_ref(), &bytes)?;
            tracing::debug!(number, len = bytes.len(), "entity delta decoded");
            let json = serde_json::to_string_pretty(&update).context("serialize json")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse json {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let config = match path {
        Some(path) => load_json(path)?,
        None => CodecConfig::default(),
    };
    config.validate().context("config validation failed")?;
    tracing::info!(variant = ?config.variant, encoding = ?config.encoding, "codec config loaded");
    Ok(config)
}

fn print_layout(label: &str, layout: &LayoutReport) {
    println!("{label} fields (fingerprint 0x{:016x}):", layout.fingerprint);
    for row in &layout.fields {
        let sent = if row.sent { "" } else { " (not sent)" };
        println!("  {:>2} {:<24} {}{sent}", row.index, row.name, row.kind);
    }
}

fn print_encoded(encoded: &EncodedDelta) {
    println!("bits: {} bytes: {}", encoded.bits, encoded.bytes.len());
    println!("hex: {}", encoded.hex());
}

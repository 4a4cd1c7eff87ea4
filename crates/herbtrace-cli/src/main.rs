//! Herbtrace CLI - hashing, chain verification and harvest checks for herb provenance.

use std::time::Duration;

use clap::{Parser, Subcommand};
use herbtrace_core::{EntityType, LedgerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{canonicalize, geofence, hash, merkle, qr, validate, verify};

#[derive(Parser)]
#[command(name = "herbtrace")]
#[command(about = "Herb provenance hashing, verification and harvest checks")]
struct Cli {
    /// Log level for herbtrace crates (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Simulated ledger commit latency in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    commit_latency_ms: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Create a hash-chain transaction for an entity payload
    Hash {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Stage of the entity
        #[arg(long)]
        entity_type: EntityType,
        /// Hash of the preceding transaction
        #[arg(long)]
        previous: Option<String>,
    },
    /// Verify a JSON array of transactions as a chain
    Verify {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Exit with error code if verification fails
        #[arg(long)]
        strict: bool,
        /// Accept a first transaction linked outside the input
        #[arg(long)]
        anchored: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merkle root of a JSON array
    Merkle {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Print an inclusion proof for the item at INDEX
        #[arg(long)]
        proof: Option<usize>,
    },
    /// Check stage order and chronology of provenance records
    Validate {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Also check each record's stage payload fields
        #[arg(long)]
        fields: bool,
        /// Exit with error code if validation fails
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a harvest location against approved zones
    Geofence {
        /// JSON file with an array of zones
        #[arg(long)]
        zones: String,
        /// Species being harvested
        #[arg(long)]
        species: String,
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Calendar month 1-12 (default: current local month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Exit with error code if the harvest is not approved
        #[arg(long)]
        strict: bool,
    },
    /// Encode or decode QR label payloads
    Qr {
        #[command(subcommand)]
        action: qr::QrAction,
    },
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("herbtrace_core={0},herbtrace_cli={0},warn", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let ledger = LedgerConfig {
        commit_latency: Duration::from_millis(cli.commit_latency_ms),
    };

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::Hash {
            input,
            entity_type,
            previous,
        } => hash::run(input, entity_type, previous, ledger).await,
        Commands::Verify {
            input,
            strict,
            anchored,
            json,
        } => verify::run(input, strict, anchored, json),
        Commands::Merkle { input, proof } => merkle::run(input, proof),
        Commands::Validate {
            input,
            fields,
            strict,
            json,
        } => validate::run(input, fields, strict, json),
        Commands::Geofence {
            zones,
            species,
            lat,
            lng,
            month,
            strict,
        } => geofence::run(zones, species, lat, lng, month, strict),
        Commands::Qr { action } => qr::run(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

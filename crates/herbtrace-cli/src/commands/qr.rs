//! QR payload command implementation.

use clap::{Subcommand, ValueEnum};
use herbtrace_canonical::HashString;
use herbtrace_core::{BatchLabel, ProductLabel, QrPayload, QrStyle};
use tracing::info;

use super::{read_input, read_json};
use crate::output;

/// Label kinds that can be encoded from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LabelKind {
    /// Manufacturing batch label.
    Batch,
    /// Packaged product label.
    Product,
}

#[derive(Subcommand)]
pub enum QrAction {
    /// Build QR text from a label JSON file
    Encode {
        /// Label JSON file (or stdin if not provided)
        input: Option<String>,
        /// Label kind
        #[arg(long, value_enum)]
        kind: LabelKind,
        /// Commitment hash to attach (Merkle root or transaction hash)
        #[arg(long)]
        hash: Option<String>,
        /// Also write the QR symbol as an SVG file
        #[arg(long)]
        svg: Option<String>,
        /// SVG edge length in pixels
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,
        /// Quiet zone in modules
        #[arg(long, default_value_t = 2)]
        margin: u32,
    },
    /// Parse scanned QR text
    Decode {
        /// File holding the scanned text (or stdin if not provided)
        input: Option<String>,
    },
}

pub fn run(action: QrAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QrAction::Encode {
            input,
            kind,
            hash,
            svg,
            width,
            margin,
        } => {
            let mut payload = match kind {
                LabelKind::Batch => QrPayload::batch(read_json::<BatchLabel>(input.as_deref())?)?,
                LabelKind::Product => {
                    QrPayload::product(read_json::<ProductLabel>(input.as_deref())?)?
                }
            };
            if let Some(hash) = hash {
                let hash = HashString::parse(hash).map_err(|e| format!("Invalid hash: {}", e))?;
                payload = payload.with_hash(hash);
            }
            if let Some(path) = svg {
                let style = QrStyle {
                    width,
                    margin,
                    ..QrStyle::default()
                };
                std::fs::write(&path, payload.to_svg(&style)?)
                    .map_err(|e| format!("Failed to write {}: {}", path, e))?;
                info!(path = %path, id = %payload.id, "QR symbol written");
            }
            println!("{}", payload.encode()?);
        }
        QrAction::Decode { input } => {
            let text = read_input(input.as_deref())?;
            let payload = QrPayload::decode(text.trim())?;
            println!("{}", output::format_json(&payload));
        }
    }
    Ok(())
}

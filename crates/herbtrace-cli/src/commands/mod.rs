//! Subcommand implementations.

use std::io::{self, Read};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod canonicalize;
pub mod geofence;
pub mod hash;
pub mod merkle;
pub mod qr;
pub mod validate;
pub mod verify;

/// Failure to obtain command input.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input file could not be read.
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Stdin could not be read.
    #[error("Failed to read stdin: {0}")]
    Stdin(#[from] io::Error),
    /// Input is not the expected JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Reads a file, or stdin when no path is given.
pub fn read_input(input: Option<&str>) -> Result<String, InputError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InputError::ReadFile {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Reads and parses JSON input.
pub fn read_json<T: DeserializeOwned>(input: Option<&str>) -> Result<T, InputError> {
    let text = read_input(input)?;
    Ok(serde_json::from_str(&text)?)
}

use thiserror::Error;

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization error.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] herbtrace_canonical::CanonicalizationError),
    /// A value failed a type-level check (bad identifier, out-of-range coordinate).
    #[error("validation error: {0}")]
    Validation(#[from] herbtrace_canonical::ValidationError),
    /// Serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Geofence zone definition is unusable.
    #[error("invalid geofence zone: {0}")]
    InvalidZone(String),
    /// QR payload could not be decoded.
    #[error("{0}")]
    InvalidQr(String),
    /// QR symbol could not be built (payload too long for any version).
    #[error("QR rendering failed: {0}")]
    QrRender(#[from] qrcode::types::QrError),
}

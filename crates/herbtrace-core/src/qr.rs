//! JSON payload carried by product and batch QR codes.
//!
//! The payload is rendered to an SVG symbol here; reading codes back from
//! camera frames or images is left to the caller, which hands the scanned
//! text to [`QrPayload::decode`].

use herbtrace_canonical::{HashString, Timestamp};
use qrcode::{Color, QrCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;

/// What a QR code points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    /// Manufacturing batch.
    Batch,
    /// Packaged product.
    Product,
    /// Collection event.
    Collection,
    /// Processing step.
    Processing,
    /// Lab test.
    Testing,
}

/// Decoded QR content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    /// Identifier of the labelled entity.
    pub id: String,
    /// Entity kind.
    #[serde(rename = "type")]
    pub kind: QrKind,
    /// Label body.
    pub data: Value,
    /// When the code was generated.
    pub timestamp: Timestamp,
    /// Merkle root or transaction hash the label commits to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashString>,
}

/// Body of a batch label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchLabel {
    /// Batch code.
    pub batch_id: String,
    /// Product name.
    pub product_name: String,
    /// Manufacturing date as printed.
    pub manufacturing_date: String,
    /// Expiry date as printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    /// Provenance commitment for the batch.
    pub provenance_hash: HashString,
}

/// Body of a product label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLabel {
    /// Product identifier.
    pub product_id: String,
    /// Product name.
    pub name: String,
    /// Product type.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Batches in the package.
    pub batch_ids: Vec<String>,
    /// Packaging date as printed.
    pub packaging_date: String,
    /// Consumer verification page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_url: Option<String>,
}

/// Rendering options for [`QrPayload::to_svg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrStyle {
    /// Rendered edge length in pixels.
    pub width: u32,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Module colour (CSS colour).
    pub dark: String,
    /// Background colour (CSS colour).
    pub light: String,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            width: 300,
            margin: 2,
            dark: "#2D4A3E".to_string(),
            light: "#FFFFFF".to_string(),
        }
    }
}

impl QrPayload {
    /// Payload stamped with the current time.
    pub fn new(id: impl Into<String>, kind: QrKind, data: Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
            timestamp: Timestamp::now(),
            hash: None,
        }
    }

    /// Batch label keyed by its batch id.
    pub fn batch(label: BatchLabel) -> Result<Self, CoreError> {
        let id = label.batch_id.clone();
        Ok(Self::new(id, QrKind::Batch, serde_json::to_value(label)?))
    }

    /// Product label keyed by its product id.
    pub fn product(label: ProductLabel) -> Result<Self, CoreError> {
        let id = label.product_id.clone();
        Ok(Self::new(id, QrKind::Product, serde_json::to_value(label)?))
    }

    /// Attaches a commitment hash.
    pub fn with_hash(mut self, hash: HashString) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Compact JSON text to embed in the code.
    pub fn encode(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders the encoded text as a square SVG symbol.
    ///
    /// The view box is one unit per module plus `margin` units on each side;
    /// dark modules are drawn as a single path over a `light` background.
    pub fn to_svg(&self, style: &QrStyle) -> Result<String, CoreError> {
        let text = self.encode()?;
        let code = QrCode::new(text.as_bytes())?;
        let modules = code.width();
        let margin = style.margin as usize;
        let size = modules + 2 * margin;

        let mut path = String::new();
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color == Color::Dark {
                let (x, y) = (i % modules + margin, i / modules + margin);
                path.push_str(&format!("M{},{}h1v1h-1z", x, y));
            }
        }

        tracing::debug!(id = %self.id, modules, "rendered QR symbol");
        Ok(format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" "#,
                r#"viewBox="0 0 {s} {s}" shape-rendering="crispEdges">"#,
                r#"<rect width="{s}" height="{s}" fill="{light}"/>"#,
                r#"<path fill="{dark}" d="{path}"/></svg>"#
            ),
            w = style.width,
            s = size,
            light = style.light,
            dark = style.dark,
            path = path,
        ))
    }

    /// Parses scanned text.
    pub fn decode(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|err| {
            tracing::debug!(error = %err, "rejected QR text");
            CoreError::InvalidQr("Invalid QR code format".to_string())
        })
    }
}

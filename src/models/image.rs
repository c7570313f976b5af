// src/models/image.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::common::Size;

/// The page dimension a scale request is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleAxis {
    Width,
    Height,
}

impl fmt::Display for ScaleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleAxis::Width => f.write_str("width"),
            ScaleAxis::Height => f.write_str("height"),
        }
    }
}

/// An author hint sizing an element relative to the page's usable area.
///
/// `fraction` is always in `(0, 1]`; requests outside that range are rejected
/// when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRequest {
    pub axis: ScaleAxis,
    pub fraction: f64,
}

/// Payload of an image block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// Source path or URL, preferring `data-filepath` over `src`.
    pub src: String,
    #[serde(default)]
    pub alt: String,
    /// Size as laid out by the browser before any scaling.
    pub natural_size: Size,
    /// Pending scale request; consumed by the layout engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleRequest>,
    /// Set when the engine shrank the image below its requested size to fit
    /// the remaining page space.
    #[serde(default)]
    pub fitted: bool,
}

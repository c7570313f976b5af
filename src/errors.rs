use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::measure::MeasureError;

/// Errors that abort laying out a document.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The measurement provider could not produce a box map for the document
    /// (could not start, render failed, timed out).
    #[error("Measurement failed: {0}")]
    Measurement(#[from] MeasureError),

    /// The HTML could not be tokenized at all.
    #[error("Malformed HTML: {0}")]
    Html(String),

    /// A layout configuration value is unusable (e.g. a non-positive page budget).
    #[error("Invalid layout configuration: {0}")]
    Config(String),

    /// A theme could not be found or lacks a required variable.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Error occurred while (de)serializing JSON configuration or box maps.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred, e.g. while reading a theme or configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A type alias for `Result<T, LayoutError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Recoverable conditions collected while laying out a document.
///
/// None of these stop the document; they are returned next to the pages and
/// logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// An element in the HTML had no entry in the box map; a zero-size block
    /// was substituted.
    MeasurementMissing { id: String, element: String },
    /// A scale hint could not be parsed; natural size was used.
    MalformedScaleRequest {
        id: String,
        attribute: String,
        value: String,
    },
    /// A block is taller than the page budget even after scaling and was placed
    /// alone on its own page.
    OverflowingBlock { id: String, height: f64, budget: f64 },
    /// An image could not shrink into the remaining space without going below
    /// the minimum image height and was moved to the next page.
    ImageDeferred { id: String, remaining: f64 },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::MeasurementMissing { id, element } => {
                write!(f, "no measurement for <{}> '{}', using zero size", element, id)
            }
            LayoutWarning::MalformedScaleRequest {
                id,
                attribute,
                value,
            } => write!(
                f,
                "ignoring malformed scale hint {}=\"{}\" on '{}'",
                attribute, value, id
            ),
            LayoutWarning::OverflowingBlock { id, height, budget } => write!(
                f,
                "block '{}' is {:.1}px tall, exceeding the {:.1}px page budget",
                id, height, budget
            ),
            LayoutWarning::ImageDeferred { id, remaining } => write!(
                f,
                "image '{}' deferred to next page ({:.1}px remaining)",
                id, remaining
            ),
        }
    }
}

use thiserror::Error;

/// Errors that can occur while rendering a laid-out deck to SVG.
#[derive(Error, Debug)]
pub enum SvgConversionError {
    #[error("Formatting error during SVG generation: {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("Missing expected data necessary for conversion: {0}")]
    MissingData(String),
    #[error("Block kind cannot be drawn on a page: {0}")]
    Unsupported(String),
}

/// A specialized Result type for SVG conversion operations.
pub type Result<T> = std::result::Result<T, SvgConversionError>;

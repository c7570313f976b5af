//! Markdown to slide layout.
//!
//! Slide markdown is rendered to one HTML document, measured once by a
//! browser-like [`Measurer`], turned into positioned [`Block`]s and paginated
//! onto fixed-size pages, scaling images and tables as requested.
//!
//! ```no_run
//! use slidemark::{LayoutConfig, LayoutEngine, RecordedMeasurer, Source};
//!
//! let measurer = RecordedMeasurer::from_file("boxes.json")?;
//! let mut engine = LayoutEngine::new(measurer, LayoutConfig::default());
//! let deck = engine.measure_and_paginate(Source::Markdown("# Hello\n\n---\n\nWorld"))?;
//! for warning in &deck.warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok::<(), slidemark::LayoutError>(())
//! ```

pub mod config;
pub mod converters;
pub mod errors;
pub mod html;
pub mod layout;
pub mod markdown;
pub mod measure;
pub mod models;

pub use config::{LayoutConfig, Theme};
pub use converters::markdown::extract_text_from_deck;
pub use converters::svg::convert_deck_to_svg;
pub use errors::{LayoutError, LayoutWarning, Result};
pub use layout::{measure_and_paginate, paginate, LayoutEngine, Source};
pub use measure::{BoxMap, MeasureError, MeasuredBox, Measurer, RecordedMeasurer, Viewport};
pub use models::{Block, BlockKind, Deck, Page};

#[cfg(not(target_arch = "wasm32"))]
pub use measure::CommandMeasurer;

// features
#[cfg(feature = "diff")]
pub mod diff;
#[cfg(feature = "diff")]
pub use diff::comparer::ComparerBuilder;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Lays out an HTML document using a box map measured elsewhere (e.g. by the
/// hosting page) and returns the deck as JSON.
///
/// `config_json` may be empty for the default configuration.
pub fn paginate_recorded(html: &str, boxes_json: &str, config_json: &str) -> Result<String> {
    let config = if config_json.trim().is_empty() {
        LayoutConfig::default()
    } else {
        LayoutConfig::from_json_str(config_json)?
    };
    let measurer = RecordedMeasurer::from_json_str(boxes_json)?;
    let mut engine = LayoutEngine::new(measurer, config);
    let deck = engine.measure_and_paginate(Source::Html(html))?;
    Ok(serde_json::to_string(&deck)?)
}

#[wasm_bindgen]
pub fn paginate_measured(
    html: &str,
    boxes_json: &str,
    config_json: &str,
) -> std::result::Result<String, JsValue> {
    paginate_recorded(html, boxes_json, config_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

//! The measurement seam: something that lays HTML out like a browser and
//! reports the box of every tracked element.
//!
//! One [`Measurer::measure`] call is made per document. Implementations:
//! closures (`FnMut(&str, Viewport) -> Result<BoxMap, MeasureError>`),
//! [`RecordedMeasurer`] for replaying a saved box map and [`CommandMeasurer`]
//! for driving an external headless renderer.

#[cfg(not(target_arch = "wasm32"))]
pub mod command;
pub mod recorded;

#[cfg(not(target_arch = "wasm32"))]
pub use command::{CommandMeasurer, MeasurementSession};
pub use recorded::RecordedMeasurer;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::common::BoundingBox;

/// Attribute carrying the id of every tracked element.
pub const BLOCK_ID_ATTR: &str = "data-bid";

/// Script a browser integration evaluates after loading the document. It
/// returns the `boxes` object of the response format for every `[data-bid]`
/// element, relative to the document origin.
pub const DOM_QUERY_SCRIPT: &str = r#"(() => {
  const boxes = {};
  for (const el of document.querySelectorAll('[data-bid]')) {
    const rect = el.getBoundingClientRect();
    const cs = window.getComputedStyle(el);
    boxes[el.getAttribute('data-bid')] = {
      x: rect.left + window.scrollX,
      y: rect.top + window.scrollY,
      width: rect.width,
      height: rect.height,
      style: {
        fontSize: parseFloat(cs.fontSize) || null,
        fontWeight: cs.fontWeight,
        fontStyle: cs.fontStyle,
        color: cs.color,
        backgroundColor: cs.backgroundColor,
        textAlign: cs.textAlign
      }
    };
  }
  return { boxes };
})()"#;

/// Size of the layout viewport the document is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

/// Computed CSS of an element, as strings the browser reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputedStyle {
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub text_align: Option<String>,
}

/// The rendered box of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ComputedStyle>,
}

impl MeasuredBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        MeasuredBox {
            x,
            y,
            width,
            height,
            style: None,
        }
    }

    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Element id to rendered box, in document order.
pub type BoxMap = IndexMap<String, MeasuredBox>;

/// Errors raised by a measurement provider. Any of these is fatal for the
/// document being measured.
#[derive(Error, Debug)]
pub enum MeasureError {
    #[error("could not start measurement provider: {0}")]
    Launch(String),

    #[error("renderer failed: {0}")]
    Render(String),

    #[error("measurement timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected provider response: {0}")]
    Protocol(String),

    #[error("provider I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lays out an HTML document and reports the box of every `data-bid` element.
pub trait Measurer {
    fn measure(&mut self, html: &str, viewport: Viewport) -> Result<BoxMap, MeasureError>;
}

impl<F> Measurer for F
where
    F: FnMut(&str, Viewport) -> Result<BoxMap, MeasureError>,
{
    fn measure(&mut self, html: &str, viewport: Viewport) -> Result<BoxMap, MeasureError> {
        self(html, viewport)
    }
}

/// Request written to a provider.
#[derive(Debug, Serialize)]
pub struct MeasureRequest<'a> {
    pub html: &'a str,
    pub viewport: Viewport,
}

/// Response read back from a provider: either `boxes` or `error`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeasureResponse {
    pub boxes: Option<BoxMap>,
    pub error: Option<String>,
}

impl MeasureResponse {
    pub fn into_boxes(self) -> Result<BoxMap, MeasureError> {
        match (self.boxes, self.error) {
            (_, Some(error)) => Err(MeasureError::Render(error)),
            (Some(boxes), None) => Ok(boxes),
            (None, None) => Err(MeasureError::Protocol(
                "response has neither `boxes` nor `error`".to_string(),
            )),
        }
    }
}

/// Parses a provider response document.
pub fn parse_response(json: &str) -> Result<BoxMap, MeasureError> {
    let response: MeasureResponse = serde_json::from_str(json)
        .map_err(|e| MeasureError::Protocol(format!("invalid JSON response: {}", e)))?;
    response.into_boxes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_measurers() {
        let mut calls = 0;
        let mut measurer = |html: &str, viewport: Viewport| {
            calls += 1;
            let mut boxes = BoxMap::new();
            boxes.insert(
                "b0".to_string(),
                MeasuredBox::new(0.0, 0.0, viewport.width, html.len() as f64),
            );
            Ok(boxes)
        };
        let boxes = measurer
            .measure("<p>hi</p>", Viewport::new(960.0, 540.0))
            .unwrap();
        assert_eq!(boxes["b0"].width, 960.0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn parses_boxes_with_optional_style() {
        let json = r#"{"boxes": {
            "b0": {"x": 40, "y": 40, "width": 880, "height": 52,
                   "style": {"fontSize": 40, "fontWeight": "700", "textAlign": "center"}},
            "b1": {"x": 40, "y": 92, "width": 880, "height": 24}
        }}"#;
        let boxes = parse_response(json).unwrap();
        assert_eq!(boxes.keys().collect::<Vec<_>>(), vec!["b0", "b1"]);
        let style = boxes["b0"].style.as_ref().unwrap();
        assert_eq!(style.font_size, Some(40.0));
        assert_eq!(style.text_align.as_deref(), Some("center"));
        assert!(boxes["b1"].style.is_none());
    }

    #[test]
    fn error_responses_are_render_failures() {
        let err = parse_response(r#"{"error": "page crashed"}"#).unwrap_err();
        assert!(matches!(err, MeasureError::Render(msg) if msg == "page crashed"));
        assert!(matches!(
            parse_response("{}").unwrap_err(),
            MeasureError::Protocol(_)
        ));
        assert!(matches!(
            parse_response("not json").unwrap_err(),
            MeasureError::Protocol(_)
        ));
    }
}

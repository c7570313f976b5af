//! Escaping, number and color formatting helpers for SVG output.

use super::constants::DEFAULT_TEXT_COLOR;
use crate::models::common::Point;
use crate::models::style::Rgb;

/// Escapes special XML characters (`&`, `<`, `>`) for use in SVG text content.
pub fn escape_svg_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes a value for use inside a double-quoted attribute.
pub fn escape_svg_attr(value: &str) -> String {
    escape_svg_text(value).replace('"', "&quot;")
}

/// Formats a pixel value with at most two decimals and no trailing zeros.
pub fn fmt_px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// `#rrggbb` for `color`, or `fallback` when unset.
pub fn format_color(color: Option<Rgb>, fallback: &str) -> String {
    color.map_or_else(|| fallback.to_string(), |c| c.to_hex())
}

pub fn text_color(color: Option<Rgb>) -> String {
    format_color(color, DEFAULT_TEXT_COLOR)
}

/// ` transform="translate(x y)"`, or nothing at the origin.
pub fn translate_attr(origin: Point) -> String {
    if origin.x == 0.0 && origin.y == 0.0 {
        String::new()
    } else {
        format!(
            r#" transform="translate({} {})""#,
            fmt_px(origin.x),
            fmt_px(origin.y)
        )
    }
}

//! Text styling and line wrapping for block text.
//!
//! The layout engine only knows block boxes, not line boxes, so text is
//! re-wrapped here with an average glyph width. This is an approximation good
//! enough for a preview; it never changes block geometry.

use std::fmt::Write;

use super::constants::*;
use super::error::Result;
use super::utils::{escape_svg_attr, escape_svg_text, fmt_px, text_color};
use crate::models::style::{Alignment, BlockStyle};

/// Font size of `style`, or `fallback`.
pub(crate) fn font_size(style: &BlockStyle, fallback: f64) -> f64 {
    style.font_size.filter(|s| *s > 0.0).unwrap_or(fallback)
}

/// Builds the `style="..."` attribute for text drawn with `style`.
pub(crate) fn apply_text_style(style: &BlockStyle, family: &str, size: f64) -> String {
    let mut css = format!(
        "font-family:{}; font-size:{}px; fill:{};",
        family,
        fmt_px(size),
        text_color(style.color)
    );
    if let Some(weight) = style.font_weight {
        css.push_str(&format!(" font-weight:{};", weight));
    }
    if style.italic {
        css.push_str(" font-style:italic;");
    }
    format!(r#" style="{}""#, escape_svg_attr(&css))
}

/// Anchor and x offset for `align` inside a box of `width`.
pub(crate) fn apply_alignment(align: Alignment, width: f64) -> (&'static str, f64) {
    match align {
        Alignment::Center => ("middle", width / 2.0),
        Alignment::End => ("end", width),
        Alignment::Start | Alignment::Justify => ("start", 0.0),
    }
}

/// Greedy word wrap of `text` into lines no wider than `width` at `size`.
///
/// Explicit newlines are kept. A word longer than a line gets a line of its own.
pub(crate) fn wrap_text(text: &str, width: f64, size: f64) -> Vec<String> {
    let glyph = (size * AVERAGE_GLYPH_WIDTH).max(1.0);
    let max_chars = ((width / glyph).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    while lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Writes `lines` as one `<text>` element with a `<tspan>` per line, the first
/// baseline one font size below `y`. Lines past `max_height` are dropped.
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_text_lines(
    lines: &[String],
    x: f64,
    y: f64,
    size: f64,
    max_height: f64,
    anchor: &str,
    style_attr: &str,
    svg_output: &mut String,
) -> Result<()> {
    let line_height = size * LINE_HEIGHT_FACTOR;
    let fitting = if max_height > 0.0 {
        ((max_height / line_height).floor() as usize).max(1)
    } else {
        lines.len()
    };

    write!(
        svg_output,
        r#"<text x="{}" y="{}" text-anchor="{}"{}>"#,
        fmt_px(x),
        fmt_px(y + size),
        anchor,
        style_attr
    )?;
    for (i, line) in lines.iter().take(fitting).enumerate() {
        let dy = if i == 0 { 0.0 } else { line_height };
        write!(
            svg_output,
            r#"<tspan x="{}" dy="{}">{}</tspan>"#,
            fmt_px(x),
            fmt_px(dy),
            escape_svg_text(line)
        )?;
    }
    writeln!(svg_output, "</text>")?;
    Ok(())
}

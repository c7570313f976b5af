//! Defaults used when a block carries no style of its own.

pub const DEFAULT_FONT_SIZE_PX: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const CODE_FONT_FAMILY: &str = "monospace";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Rough advance of one glyph as a multiple of the font size, used for wrapping.
pub const AVERAGE_GLYPH_WIDTH: f64 = 0.55;

pub const FRAME_STROKE: &str = "#d0d0d0";
pub const CODE_BACKGROUND: &str = "#f5f5f5";
pub const TABLE_HEADER_BACKGROUND: &str = "#eeeeee";
pub const TABLE_CELL_PADDING: f64 = 4.0;
/// Horizontal indent per list nesting level.
pub const LIST_INDENT: f64 = 24.0;
pub const ADMONITION_BAR_WIDTH: f64 = 4.0;

//! Per-block SVG rendering.
//!
//! Every block is drawn inside a `<g>` translated to its position, so block
//! content is written in block-local coordinates. Column containers and
//! columns recurse into their children, whose positions are already relative
//! to the enclosing block.

use log::{debug, warn};
use std::fmt::Write;

use super::constants::*;
use super::error::{Result, SvgConversionError};
use super::text::{apply_alignment, apply_text_style, font_size, wrap_text, write_text_lines};
use super::utils::{escape_svg_attr, fmt_px, format_color, translate_attr};
use crate::config::FontSizes;
use crate::models::block::{Block, BlockKind};
use crate::models::image::ImageContent;
use crate::models::list::{ListContent, ListType};
use crate::models::style::{Alignment, BlockStyle};
use crate::models::table::TableContent;

/// Draws wrapped text filling the block box.
fn convert_text_to_svg(
    text: &str,
    style: &BlockStyle,
    family: &str,
    size: f64,
    width: f64,
    height: f64,
    svg_output: &mut String,
) -> Result<()> {
    let (anchor, x) = apply_alignment(style.align, width);
    let lines = wrap_text(text, width, size);
    let style_attr = apply_text_style(style, family, size);
    write_text_lines(&lines, x, 0.0, size, height, anchor, &style_attr, svg_output)
}

fn convert_list_to_svg(
    list: &ListContent,
    style: &BlockStyle,
    size: f64,
    width: f64,
    svg_output: &mut String,
) -> Result<()> {
    let line_height = size * LINE_HEIGHT_FACTOR;
    let style_attr = apply_text_style(style, DEFAULT_FONT_FAMILY, size);
    let mut y = 0.0;
    let mut number = list.start.unwrap_or(1);

    for item in &list.items {
        let indent = LIST_INDENT * f64::from(item.level);
        let marker = match list.list_type {
            ListType::Ordered if item.level == 0 => {
                let marker = format!("{}.", number);
                number += 1;
                marker
            }
            _ => "\u{2022}".to_string(),
        };
        let lines = wrap_text(&item.text, (width - indent - LIST_INDENT).max(1.0), size);

        write_text_lines(
            &[marker],
            indent,
            y,
            size,
            0.0,
            "start",
            &style_attr,
            svg_output,
        )?;
        write_text_lines(
            &lines,
            indent + LIST_INDENT,
            y,
            size,
            0.0,
            "start",
            &style_attr,
            svg_output,
        )?;
        y += line_height * lines.len() as f64;
    }
    Ok(())
}

fn convert_code_to_svg(
    text: &str,
    style: &BlockStyle,
    size: f64,
    width: f64,
    height: f64,
    svg_output: &mut String,
) -> Result<()> {
    writeln!(
        svg_output,
        r#"<rect width="{}" height="{}" fill="{}" />"#,
        fmt_px(width),
        fmt_px(height),
        format_color(style.background, CODE_BACKGROUND)
    )?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let style_attr = apply_text_style(style, CODE_FONT_FAMILY, size);
    write_text_lines(
        &lines,
        TABLE_CELL_PADDING,
        0.0,
        size,
        height,
        "start",
        &style_attr,
        svg_output,
    )
}

fn convert_image_to_svg(
    image: &ImageContent,
    block_id: &str,
    width: f64,
    height: f64,
    svg_output: &mut String,
) -> Result<()> {
    if width <= 0.0 || height <= 0.0 {
        warn!(
            "Skipping image {} with zero dimensions ({}x{}).",
            block_id, width, height
        );
        return Ok(());
    }

    if image.src.is_empty() {
        warn!("Image {} has no source.", block_id);
        write!(
            svg_output,
            r#"<rect width="{}" height="{}" style="fill:#e0e0e0; stroke:gray; fill-opacity:0.5;" />"#,
            fmt_px(width),
            fmt_px(height)
        )?;
        writeln!(
            svg_output,
            r#"<text x="2" y="2" dy="1em" style="font-family:sans-serif; font-size:10px; fill:gray;">Image Missing Source</text>"#
        )?;
        return Ok(());
    }

    writeln!(
        svg_output,
        r#"<image x="0" y="0" width="{}" height="{}" xlink:href="{}" preserveAspectRatio="xMidYMid meet"{}><title>{}</title></image>"#,
        fmt_px(width),
        fmt_px(height),
        escape_svg_attr(&image.src),
        if image.fitted {
            r#" data-fitted="true""#
        } else {
            ""
        },
        escape_svg_attr(&image.alt)
    )?;
    Ok(())
}

/// Column widths scaled to the table's laid-out width. Falls back to equal
/// columns when the measured widths do not match the grid.
fn table_column_widths(table: &TableContent, width: f64) -> Vec<f64> {
    let columns = table.column_count();
    if columns == 0 {
        return Vec::new();
    }
    if let Some(measured) = &table.column_widths {
        let total: f64 = measured.iter().sum();
        if measured.len() == columns && total > 0.0 {
            return measured.iter().map(|w| w * width / total).collect();
        }
    }
    vec![width / columns as f64; columns]
}

fn convert_table_to_svg(
    table: &TableContent,
    style: &BlockStyle,
    size: f64,
    width: f64,
    height: f64,
    svg_output: &mut String,
) -> Result<()> {
    if table.rows.is_empty() {
        return Ok(());
    }
    let widths = table_column_widths(table, width);
    let row_height = height / table.rows.len() as f64;
    // Scaled tables shrink their text with the grid.
    let cell_size = size.min((row_height - 2.0 * TABLE_CELL_PADDING).max(1.0) / LINE_HEIGHT_FACTOR);

    for (row_idx, row) in table.rows.iter().enumerate() {
        let y = row_idx as f64 * row_height;
        let mut x = 0.0;
        for (col_idx, cell_width) in widths.iter().enumerate() {
            let cell = row.get(col_idx);
            let fill = match cell {
                Some(c) if c.header => TABLE_HEADER_BACKGROUND,
                _ => "none",
            };
            writeln!(
                svg_output,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" />"#,
                fmt_px(x),
                fmt_px(y),
                fmt_px(*cell_width),
                fmt_px(row_height),
                fill,
                DEFAULT_TEXT_COLOR
            )?;

            if let Some(cell) = cell {
                let mut cell_style = style.clone();
                if cell.header {
                    cell_style.font_weight = Some(700);
                }
                if let Some(align) = cell.align {
                    cell_style.align = align;
                }
                let inner = (cell_width - 2.0 * TABLE_CELL_PADDING).max(1.0);
                let (anchor, offset) = apply_alignment(cell_style.align, inner);
                let lines = wrap_text(&cell.text, inner, cell_size);
                write_text_lines(
                    &lines,
                    x + TABLE_CELL_PADDING + offset,
                    y + TABLE_CELL_PADDING,
                    cell_size,
                    row_height - 2.0 * TABLE_CELL_PADDING,
                    anchor,
                    &apply_text_style(&cell_style, DEFAULT_FONT_FAMILY, cell_size),
                    svg_output,
                )?;
            }
            x += cell_width;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn convert_admonition_to_svg(
    variant: &str,
    title: Option<&str>,
    text: &str,
    style: &BlockStyle,
    size: f64,
    width: f64,
    height: f64,
    svg_output: &mut String,
) -> Result<()> {
    writeln!(
        svg_output,
        r#"<rect width="{}" height="{}" fill="{}" class="admonition-{}" />"#,
        fmt_px(ADMONITION_BAR_WIDTH),
        fmt_px(height),
        format_color(style.color, DEFAULT_TEXT_COLOR),
        escape_svg_attr(variant)
    )?;
    let x = ADMONITION_BAR_WIDTH * 3.0;
    let inner = (width - x).max(1.0);
    let mut y = 0.0;
    if let Some(title) = title {
        let title_style = BlockStyle {
            font_weight: Some(700),
            ..style.clone()
        };
        write_text_lines(
            &[title.to_string()],
            x,
            y,
            size,
            0.0,
            "start",
            &apply_text_style(&title_style, DEFAULT_FONT_FAMILY, size),
            svg_output,
        )?;
        y += size * LINE_HEIGHT_FACTOR;
    }
    write_text_lines(
        &wrap_text(text, inner, size),
        x,
        y,
        size,
        (height - y).max(0.0),
        "start",
        &apply_text_style(style, DEFAULT_FONT_FAMILY, size),
        svg_output,
    )
}

/// Converts one block, and its children, to an SVG fragment.
pub(crate) fn convert_block_to_svg(
    block: &Block,
    font_sizes: &FontSizes,
    svg_output: &mut String,
) -> Result<()> {
    let (width, height) = (block.width(), block.height());
    let style = &block.style;
    debug!(
        "Rendering {} block {} ({}x{})",
        block.kind.name(),
        block.id,
        width,
        height
    );

    writeln!(
        svg_output,
        r#"<g data-block-id="{}" data-kind="{}"{}>"#,
        escape_svg_attr(&block.id),
        block.kind.name(),
        translate_attr(block.position)
    )?;
    if let Some(background) = style.background {
        writeln!(
            svg_output,
            r#"<rect width="{}" height="{}" fill="{}" />"#,
            fmt_px(width),
            fmt_px(height),
            background.to_hex()
        )?;
    }

    match &block.kind {
        BlockKind::Heading { level, text, .. } => {
            let size = font_size(style, font_sizes.heading(*level));
            convert_text_to_svg(text, style, DEFAULT_FONT_FAMILY, size, width, height, svg_output)?;
        }
        BlockKind::Paragraph { text, quote, .. } => {
            let size = font_size(style, font_sizes.body);
            if *quote {
                writeln!(
                    svg_output,
                    r#"<rect width="{}" height="{}" fill="{}" />"#,
                    fmt_px(ADMONITION_BAR_WIDTH),
                    fmt_px(height),
                    FRAME_STROKE
                )?;
                writeln!(
                    svg_output,
                    r#"<g transform="translate({} 0)">"#,
                    fmt_px(ADMONITION_BAR_WIDTH * 3.0)
                )?;
                convert_text_to_svg(
                    text,
                    style,
                    DEFAULT_FONT_FAMILY,
                    size,
                    (width - ADMONITION_BAR_WIDTH * 3.0).max(1.0),
                    height,
                    svg_output,
                )?;
                writeln!(svg_output, "</g>")?;
            } else {
                convert_text_to_svg(text, style, DEFAULT_FONT_FAMILY, size, width, height, svg_output)?;
            }
        }
        BlockKind::ListItem { level, text, .. } => {
            let size = font_size(style, font_sizes.body);
            let indent = LIST_INDENT * f64::from(*level);
            writeln!(svg_output, r#"<g transform="translate({} 0)">"#, fmt_px(indent))?;
            convert_text_to_svg(
                &format!("\u{2022} {}", text),
                style,
                DEFAULT_FONT_FAMILY,
                size,
                (width - indent).max(1.0),
                height,
                svg_output,
            )?;
            writeln!(svg_output, "</g>")?;
        }
        BlockKind::List(list) => {
            convert_list_to_svg(list, style, font_size(style, font_sizes.body), width, svg_output)?;
        }
        BlockKind::Code { text, .. } => {
            let size = font_size(style, font_sizes.code);
            convert_code_to_svg(text, style, size, width, height, svg_output)?;
        }
        BlockKind::Image(image) => {
            convert_image_to_svg(image, &block.id, width, height, svg_output)?;
        }
        BlockKind::Table(table) => {
            let size = font_size(style, font_sizes.body);
            convert_table_to_svg(table, style, size, width, height, svg_output)?;
        }
        BlockKind::Math { tex, .. } => {
            let math_style = BlockStyle {
                italic: true,
                align: Alignment::Center,
                ..style.clone()
            };
            let size = font_size(style, font_sizes.body);
            convert_text_to_svg(tex, &math_style, "serif", size, width, height, svg_output)?;
        }
        BlockKind::Admonition {
            variant,
            title,
            text,
            ..
        } => {
            let size = font_size(style, font_sizes.body);
            convert_admonition_to_svg(
                variant,
                title.as_deref(),
                text,
                style,
                size,
                width,
                height,
                svg_output,
            )?;
        }
        BlockKind::ColumnContainer | BlockKind::Column { .. } => {
            for child in &block.children {
                convert_block_to_svg(child, font_sizes, svg_output)?;
            }
        }
        BlockKind::PageBreak => {
            return Err(SvgConversionError::Unsupported(format!(
                "page-break marker '{}' placed on a page",
                block.id
            )));
        }
    }

    writeln!(
        svg_output,
        r#"<rect width="{}" height="{}" fill="none" stroke="{}" stroke-dasharray="2 2" />"#,
        fmt_px(width),
        fmt_px(height),
        FRAME_STROKE
    )?;
    writeln!(svg_output, "</g>")?;
    Ok(())
}

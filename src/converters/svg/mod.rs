//! Renders laid-out decks to Scalable Vector Graphics (SVG) for inspection.
//!
//! One SVG document is produced per page, sized to the deck's page geometry.
//!
//! # Current Features & Limitations:
//! *   Draws the page background and the margin box.
//! *   Draws a dashed frame around every block at its paginated position.
//! *   Text blocks are re-wrapped with an approximate glyph width.
//! *   Images are referenced by source, never embedded.
//! *   Tables are drawn as a grid using the measured column widths.
//! *   Column containers and columns are drawn as nested groups.

mod constants;
mod elements;
mod error;
mod text;
mod utils;

pub use error::{Result, SvgConversionError};
pub use utils::escape_svg_text;

use log::debug;
use std::fmt::Write;

use crate::config::LayoutConfig;
use crate::models::page::{Deck, Page};
use constants::{DEFAULT_BACKGROUND_COLOR, FRAME_STROKE};
use elements::convert_block_to_svg;
use utils::fmt_px;

/// Converts one page of a deck laid out with `config` to an SVG document.
pub fn convert_page_to_svg(page: &Page, config: &LayoutConfig) -> Result<String> {
    if config.page_width <= 0.0 || config.page_height <= 0.0 {
        return Err(SvgConversionError::MissingData(format!(
            "invalid page size {}x{}",
            config.page_width, config.page_height
        )));
    }

    let mut svg_string = String::new();
    writeln!(
        svg_string,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{0}" height="{1}" viewBox="0 0 {0} {1}" data-page="{2}"{3}>"#,
        fmt_px(config.page_width),
        fmt_px(config.page_height),
        page.index,
        if page.overflow {
            r#" data-overflow="true""#
        } else {
            ""
        }
    )?;
    writeln!(
        svg_string,
        r#"<rect width="100%" height="100%" fill="{}" />"#,
        DEFAULT_BACKGROUND_COLOR
    )?;
    if config.margin > 0.0 {
        writeln!(
            svg_string,
            r#"<rect x="{0}" y="{0}" width="{1}" height="{2}" fill="none" stroke="{3}" />"#,
            fmt_px(config.margin),
            fmt_px(config.available_width()),
            fmt_px(config.page_budget()),
            FRAME_STROKE
        )?;
    }

    for block in &page.blocks {
        convert_block_to_svg(block, &config.font_sizes, &mut svg_string)?;
    }

    writeln!(svg_string, "</svg>")?;
    Ok(svg_string)
}

/// Converts every page of `deck` to an SVG document, in page order.
pub fn convert_deck_to_svg(deck: &Deck) -> Result<Vec<String>> {
    let mut svg_pages = Vec::with_capacity(deck.page_count());
    for page in &deck.pages {
        debug!("Rendering page {} ({} blocks)", page.index, page.len());
        let svg = convert_page_to_svg(page, &deck.config).map_err(|e| match e {
            SvgConversionError::FormatError(_) => e,
            SvgConversionError::MissingData(msg) => {
                SvgConversionError::MissingData(format!("page {}: {}", page.index + 1, msg))
            }
            SvgConversionError::Unsupported(msg) => {
                SvgConversionError::Unsupported(format!("page {}: {}", page.index + 1, msg))
            }
        })?;
        svg_pages.push(svg);
    }
    Ok(svg_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block::{Block, BlockKind};
    use crate::models::common::{BoundingBox, Size};
    use crate::models::image::ImageContent;

    fn deck_with(blocks: Vec<Block>) -> Deck {
        Deck {
            pages: vec![Page {
                index: 0,
                blocks,
                content_height: 0.0,
                overflow: false,
            }],
            warnings: Vec::new(),
            config: LayoutConfig::default(),
        }
    }

    #[test]
    fn one_svg_per_page_sized_to_the_deck() {
        let heading = Block::new(
            "b0",
            BlockKind::Heading {
                level: 1,
                text: "Fish & Chips".into(),
                html: "Fish &amp; Chips".into(),
            },
            BoundingBox::new(40.0, 40.0, 880.0, 48.0),
        );
        let svgs = convert_deck_to_svg(&deck_with(vec![heading])).unwrap();
        assert_eq!(svgs.len(), 1);
        let svg = &svgs[0];
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 960 540""#));
        assert!(svg.contains(r#"transform="translate(40 40)""#));
        assert!(svg.contains("Fish &amp; Chips"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn fitted_images_are_marked() {
        let image = Block::new(
            "b1",
            BlockKind::Image(ImageContent {
                src: "cat.png".into(),
                alt: "a cat".into(),
                natural_size: Size::new(800.0, 600.0),
                scale: None,
                fitted: true,
            }),
            BoundingBox::new(40.0, 40.0, 400.0, 300.0),
        );
        let svgs = convert_deck_to_svg(&deck_with(vec![image])).unwrap();
        assert!(svgs[0].contains(r#"xlink:href="cat.png""#));
        assert!(svgs[0].contains(r#"data-fitted="true""#));
    }

    #[test]
    fn invalid_page_size_is_reported() {
        let mut deck = deck_with(Vec::new());
        deck.config.page_width = 0.0;
        assert!(matches!(
            convert_deck_to_svg(&deck),
            Err(SvgConversionError::MissingData(_))
        ));
    }
}

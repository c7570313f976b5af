//! The layout and pagination engine.
//!
//! One document goes through: markdown to HTML (when given markdown), one
//! measurement round trip, block building, then pagination with image scaling.
//! Only a measurement failure aborts the document; everything else is reported
//! as a [`LayoutWarning`](crate::errors::LayoutWarning) on the resulting
//! [`Deck`].

pub mod builder;
pub mod paginate;
pub mod scaling;

pub use builder::{build_blocks, BuiltBlocks};
pub use paginate::paginate;

use crate::config::{LayoutConfig, Theme};
use crate::errors::Result;
use crate::markdown;
use crate::measure::Measurer;
use crate::models::block::Block;
use crate::models::page::Deck;

/// What to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    /// Slide markdown; rendered and styled with the engine's theme.
    Markdown(&'a str),
    /// A ready document whose tracked elements carry `data-bid`s.
    Html(&'a str),
}

/// Lays out documents with a measurer, a configuration and a theme.
pub struct LayoutEngine<M> {
    measurer: M,
    config: LayoutConfig,
    theme: Theme,
}

impl<M: Measurer> LayoutEngine<M> {
    /// An engine using the built-in theme's stylesheet.
    pub fn new(measurer: M, config: LayoutConfig) -> Self {
        LayoutEngine {
            measurer,
            config,
            theme: Theme::builtin(),
        }
    }

    /// An engine whose geometry comes from `theme`'s custom properties.
    pub fn with_theme(measurer: M, theme: Theme) -> Result<Self> {
        let config = LayoutConfig::from_theme(&theme)?;
        Ok(LayoutEngine {
            measurer,
            config,
            theme,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn measurer_mut(&mut self) -> &mut M {
        &mut self.measurer
    }

    pub fn into_measurer(self) -> M {
        self.measurer
    }

    /// The HTML document that would be sent to the measurer for `source`.
    pub fn document(&self, source: Source<'_>) -> Result<String> {
        document_for(source, &self.theme, &self.config)
    }

    pub fn measure_and_paginate(&mut self, source: Source<'_>) -> Result<Deck> {
        layout_document(&mut self.measurer, source, &self.theme, &self.config)
    }
}

/// Lays out `source` on pages of `page_width` x `page_height` with no margin,
/// returning the blocks of each page.
pub fn measure_and_paginate<M: Measurer>(
    measurer: &mut M,
    source: Source<'_>,
    page_height: f64,
    page_width: f64,
) -> Result<Vec<Vec<Block>>> {
    let config = LayoutConfig::with_budget(page_width, page_height);
    let deck = layout_document(measurer, source, &Theme::builtin(), &config)?;
    Ok(deck.into_block_pages())
}

fn document_for(source: Source<'_>, theme: &Theme, config: &LayoutConfig) -> Result<String> {
    match source {
        Source::Markdown(md) => Ok(markdown::build_document(md, &theme.css_for(config))?.html),
        Source::Html(html) => Ok(html.to_string()),
    }
}

fn layout_document<M: Measurer>(
    measurer: &mut M,
    source: Source<'_>,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Deck> {
    config.validate()?;
    let html = document_for(source, theme, config)?;
    let boxes = measurer.measure(&html, config.viewport())?;
    let built = build_blocks(&html, &boxes, config)?;

    let mut deck = paginate(built.blocks, config);
    let mut warnings = built.warnings;
    warnings.append(&mut deck.warnings);
    deck.warnings = warnings;

    log::info!(
        "Laid out {} blocks on {} pages ({} warnings)",
        deck.block_count(),
        deck.page_count(),
        deck.warnings.len()
    );
    Ok(deck)
}

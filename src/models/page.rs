// src/models/page.rs

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::errors::LayoutWarning;
use crate::models::block::Block;

/// Blocks assigned to one output slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Zero-based page number within the deck.
    pub index: usize,
    pub blocks: Vec<Block>,
    /// Sum of block heights plus inter-block spacing.
    pub content_height: f64,
    /// True when the page holds a single block taller than the page budget.
    #[serde(default)]
    pub overflow: bool,
}

impl Page {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// The result of laying out one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub pages: Vec<Page>,
    /// Recoverable conditions met while laying out, in the order they occurred.
    #[serde(default)]
    pub warnings: Vec<LayoutWarning>,
    /// Geometry the deck was laid out with.
    pub config: LayoutConfig,
}

impl Deck {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// All blocks in document order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|page| page.blocks.iter())
    }

    /// Drops page metadata, leaving the pages-of-blocks shape renderers consume.
    pub fn into_block_pages(self) -> Vec<Vec<Block>> {
        self.pages.into_iter().map(|page| page.blocks).collect()
    }
}

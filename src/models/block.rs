// src/models/block.rs

use serde::{Deserialize, Serialize};

use crate::models::common::{BoundingBox, Point, Size};
use crate::models::image::{ImageContent, ScaleRequest};
use crate::models::list::ListContent;
use crate::models::style::BlockStyle;
use crate::models::table::TableContent;

/// How a column inside a column container is sized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    /// Equal share of the container.
    #[default]
    Default,
    /// Sized to its content.
    Auto,
    /// Percentage of the container width, in `(0, 100]`.
    Percent(f64),
}

impl ColumnWidth {
    /// Parses the `data-column-width` attribute (`auto`, `40%`, `40`).
    pub fn parse(value: &str) -> ColumnWidth {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return ColumnWidth::Auto;
        }
        value
            .strip_suffix('%')
            .unwrap_or(value)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| *p > 0.0 && *p <= 100.0)
            .map_or(ColumnWidth::Default, ColumnWidth::Percent)
    }
}

/// The kind of a block together with its kind-specific payload.
///
/// Serialized internally tagged, e.g. `{"kind": "heading", "level": 2, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BlockKind {
    Heading {
        level: u8,
        text: String,
        html: String,
    },
    Paragraph {
        text: String,
        html: String,
        /// Came from a `blockquote`.
        #[serde(default)]
        quote: bool,
    },
    /// Consecutive list items of one container, merged.
    List(ListContent),
    /// A list item found outside any list container.
    ListItem {
        level: u8,
        text: String,
        html: String,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },
    Image(ImageContent),
    Table(TableContent),
    Math {
        tex: String,
        display: bool,
    },
    Admonition {
        variant: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        text: String,
        html: String,
    },
    /// Holds `Column` children; paginated as one unit.
    ColumnContainer,
    /// Holds the blocks of one column, positioned relative to the column origin.
    Column {
        #[serde(default)]
        width: ColumnWidth,
    },
    /// Forces the current page to close. Never placed on a page.
    PageBreak,
}

impl BlockKind {
    /// Short kind name, matching the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Heading { .. } => "heading",
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::List(_) => "list",
            BlockKind::ListItem { .. } => "list-item",
            BlockKind::Code { .. } => "code",
            BlockKind::Image(_) => "image",
            BlockKind::Table(_) => "table",
            BlockKind::Math { .. } => "math",
            BlockKind::Admonition { .. } => "admonition",
            BlockKind::ColumnContainer => "column-container",
            BlockKind::Column { .. } => "column",
            BlockKind::PageBreak => "page-break",
        }
    }
}

/// A positioned, renderer-agnostic unit of slide content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// The `data-bid` of the element this block was built from.
    pub id: String,
    /// Page-local position once paginated; document position before.
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub style: BlockStyle,
    /// Index of the markdown slide the block came from.
    #[serde(default)]
    pub source_slide: usize,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind, bounds: BoundingBox) -> Self {
        Block {
            id: id.into(),
            position: bounds.origin(),
            size: bounds.size(),
            style: BlockStyle::default(),
            source_slide: 0,
            kind,
            children: Vec::new(),
        }
    }

    /// A zero-size page-break marker.
    pub fn page_break(id: impl Into<String>, source_slide: usize) -> Self {
        let mut block = Block::new(id, BlockKind::PageBreak, BoundingBox::default());
        block.source_slide = source_slide;
        block
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self.kind, BlockKind::PageBreak)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { .. })
    }

    /// The pending scale request of an image or table block.
    pub fn scale_request(&self) -> Option<ScaleRequest> {
        match &self.kind {
            BlockKind::Image(image) => image.scale,
            BlockKind::Table(table) => table.scale,
            _ => None,
        }
    }

    /// Plain-text summary of the block's content.
    pub fn text(&self) -> String {
        match &self.kind {
            BlockKind::Heading { text, .. }
            | BlockKind::Paragraph { text, .. }
            | BlockKind::ListItem { text, .. }
            | BlockKind::Code { text, .. }
            | BlockKind::Admonition { text, .. } => text.clone(),
            BlockKind::List(list) => list
                .items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            BlockKind::Image(image) => image.alt.clone(),
            BlockKind::Table(table) => table
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            BlockKind::Math { tex, .. } => tex.clone(),
            BlockKind::ColumnContainer | BlockKind::Column { .. } => self
                .children
                .iter()
                .map(Block::text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            BlockKind::PageBreak => String::new(),
        }
    }
}

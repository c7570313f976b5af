//! Renderer-agnostic content model: blocks, pages and decks.

pub mod block;
pub mod common;
pub mod image;
pub mod list;
pub mod page;
pub mod style;
pub mod table;

pub use block::{Block, BlockKind, ColumnWidth};
pub use common::{BoundingBox, Point, Size};
pub use image::{ImageContent, ScaleAxis, ScaleRequest};
pub use list::{ListContent, ListItem, ListType};
pub use page::{Deck, Page};
pub use style::{Alignment, BlockStyle, Rgb};
pub use table::{TableCell, TableContent};

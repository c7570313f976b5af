//! Renderers for laid-out decks: an SVG preview and a markdown outline.

pub mod markdown;
pub mod svg;

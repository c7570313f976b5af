//! Markdown front end: slide splitting, slide syntax and document assembly.
//!
//! [`build_document`] produces the single HTML document that is measured in
//! one pass: one `<div class="slide">` per markdown slide, a
//! `<div class="page-break">` between slides, the theme stylesheet inlined and
//! a `data-bid` on every element the layout engine tracks.

pub mod slides;
pub mod syntax;

pub use slides::{count_page_breaks, is_slide_separator, split_slides};
pub use syntax::preprocess;

use pulldown_cmark::{html, Options, Parser};

use crate::errors::Result;
use crate::html::{self as dom, assign_block_ids, BlockIdAllocator, Element, Node};

/// A measurable HTML document built from markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDocument {
    pub html: String,
    /// Number of non-empty markdown slides.
    pub slide_count: usize,
    /// Number of `data-bid` ids assigned.
    pub tracked_count: usize,
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

/// Renders the markdown of one slide to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    let processed = preprocess(markdown);
    let parser = Parser::new_ext(&processed, parser_options());
    let mut out = String::with_capacity(processed.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Splits a document into slides and renders each to an HTML fragment.
pub fn render_slides(markdown: &str) -> Vec<String> {
    split_slides(markdown)
        .iter()
        .map(|slide| render_html(slide))
        .collect()
}

/// Wraps rendered slide fragments into one measurable document.
pub fn assemble_document(slides: &[String], css: &str) -> Result<SlideDocument> {
    let mut body: Vec<Node> = Vec::with_capacity(slides.len() * 2);
    for (index, fragment) in slides.iter().enumerate() {
        if index > 0 {
            body.push(Node::Element(
                Element::new("div").with_attr("class", "page-break"),
            ));
        }
        let mut slide = Element::new("div")
            .with_attr("class", "slide")
            .with_attr("id", format!("slide-{}", index));
        slide.children = dom::parse(fragment)?;
        body.push(Node::Element(slide));
    }

    let mut ids = BlockIdAllocator::new();
    let tracked_count = assign_block_ids(&mut body, &mut ids);
    log::debug!(
        "Assembled {} slides with {} tracked elements",
        slides.len(),
        tracked_count
    );

    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        css,
        dom::to_html(&body)
    );
    Ok(SlideDocument {
        html,
        slide_count: slides.len(),
        tracked_count,
    })
}

/// Markdown to a measurable document styled with `css`.
pub fn build_document(markdown: &str, css: &str) -> Result<SlideDocument> {
    assemble_document(&render_slides(markdown), css)
}

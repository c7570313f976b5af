//! Measured DOM to blocks.
//!
//! Walks the document in order and turns every tracked element into a
//! [`Block`] positioned by its measured box. Lists, tables and column layouts
//! become single blocks; slide boundaries become page-break markers.

use crate::config::LayoutConfig;
use crate::errors::{LayoutWarning, Result};
use crate::html::{self as dom, clean_inner_html, Element, Node};
use crate::measure::{BoxMap, ComputedStyle, MeasuredBox, BLOCK_ID_ATTR};
use crate::models::block::{Block, BlockKind, ColumnWidth};
use crate::models::common::{BoundingBox, Point};
use crate::models::image::{ImageContent, ScaleAxis, ScaleRequest};
use crate::models::list::{ListContent, ListItem, ListType};
use crate::models::style::{inline_style_value, parse_px, Alignment, BlockStyle, Rgb};
use crate::models::table::{TableCell, TableContent};

/// Blocks in document order plus the warnings raised while building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltBlocks {
    pub blocks: Vec<Block>,
    pub warnings: Vec<LayoutWarning>,
}

/// Builds the flat block sequence for a measured document.
pub fn build_blocks(html: &str, boxes: &BoxMap, config: &LayoutConfig) -> Result<BuiltBlocks> {
    let nodes = dom::parse(html)?;
    let mut builder = BlockBuilder::new(boxes, config);
    let mut blocks = Vec::new();
    match find_body(&nodes) {
        Some(body) => builder.walk(&body.children, 0, &mut blocks),
        None => builder.walk(&nodes, 0, &mut blocks),
    }
    log::debug!(
        "Built {} blocks from {} measured boxes",
        blocks.len(),
        boxes.len()
    );
    Ok(BuiltBlocks {
        blocks,
        warnings: builder.warnings,
    })
}

fn find_body(nodes: &[Node]) -> Option<&Element> {
    for node in nodes {
        if let Some(el) = node.as_element() {
            if el.is("body") {
                return Some(el);
            }
            if let Some(body) = el.find(|e| e.is("body")) {
                return Some(body);
            }
        }
    }
    None
}

const SKIPPED: &[&str] = &["head", "style", "script", "title", "meta", "link", "template"];

struct BlockBuilder<'a> {
    boxes: &'a BoxMap,
    config: &'a LayoutConfig,
    warnings: Vec<LayoutWarning>,
    slides_seen: usize,
    unnamed: usize,
}

impl<'a> BlockBuilder<'a> {
    fn new(boxes: &'a BoxMap, config: &'a LayoutConfig) -> Self {
        BlockBuilder {
            boxes,
            config,
            warnings: Vec::new(),
            slides_seen: 0,
            unnamed: 0,
        }
    }

    fn walk(&mut self, nodes: &[Node], slide: usize, out: &mut Vec<Block>) {
        for el in nodes.iter().filter_map(Node::as_element) {
            if SKIPPED.contains(&el.name.as_str()) {
                continue;
            }
            if el.is("div") && el.has_class("slide") {
                let index = el
                    .attr("id")
                    .and_then(|id| id.strip_prefix("slide-"))
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(self.slides_seen);
                self.slides_seen = index + 1;
                self.walk(&el.children, index, out);
                continue;
            }
            if el.is("div") && el.has_class("page-break") {
                let id = self.id_of(el);
                out.push(Block::page_break(id, slide));
                continue;
            }
            match self.build(el, slide) {
                Some(mut block) => {
                    set_source_slide(&mut block, slide);
                    out.push(block);
                }
                None => self.walk(&el.children, slide, out),
            }
        }
    }

    /// The block for `el`, or `None` when `el` is a plain container whose
    /// children should be visited instead.
    fn build(&mut self, el: &Element, slide: usize) -> Option<Block> {
        if let Some(level) = el.heading_level() {
            let kind = BlockKind::Heading {
                level,
                text: el.text(),
                html: clean_inner_html(el),
            };
            let font = self.config.font_sizes.heading(level);
            let mut block = self.measured_block(el, kind, Some(font));
            block.style.font_weight.get_or_insert(700);
            return Some(block);
        }

        let block = match el.name.as_str() {
            "p" => match sole_image(el) {
                Some(img) => self.image_block(img, Some(el)),
                None => {
                    let kind = BlockKind::Paragraph {
                        text: el.text(),
                        html: clean_inner_html(el),
                        quote: false,
                    };
                    let font = self.config.font_sizes.body;
                    self.measured_block(el, kind, Some(font))
                }
            },
            "img" => self.image_block(el, None),
            "ul" | "ol" => self.list_block(el),
            "li" => {
                let (text, html) = list_item_content(el);
                let kind = BlockKind::ListItem {
                    level: 0,
                    text,
                    html,
                };
                let font = self.config.font_sizes.body;
                self.measured_block(el, kind, Some(font))
            }
            "pre" => {
                let language = el.find(|e| e.is("code")).and_then(|code| {
                    code.classes()
                        .find_map(|c| c.strip_prefix("language-"))
                        .map(str::to_string)
                });
                let kind = BlockKind::Code {
                    language,
                    text: el.text_content().trim_end_matches('\n').to_string(),
                };
                let font = self.config.font_sizes.code;
                self.measured_block(el, kind, Some(font))
            }
            "table" => self.table_block(el),
            "blockquote" => {
                let kind = BlockKind::Paragraph {
                    text: el.text(),
                    html: clean_inner_html(el),
                    quote: true,
                };
                let font = self.config.font_sizes.body;
                self.measured_block(el, kind, Some(font))
            }
            "div" if el.has_class("math") => {
                let kind = BlockKind::Math {
                    tex: el.text_content().trim().to_string(),
                    display: true,
                };
                self.measured_block(el, kind, None)
            }
            "div" if el.has_class("admonition") => self.admonition_block(el),
            "div" if el.has_class("columns") => self.columns_block(el, slide),
            _ => return None,
        };
        Some(block)
    }

    fn id_of(&mut self, el: &Element) -> String {
        match el.attr(BLOCK_ID_ATTR) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("{}-unmeasured-{}", el.name, self.unnamed);
                self.unnamed += 1;
                id
            }
        }
    }

    fn measured(&self, el: &Element) -> Option<&'a MeasuredBox> {
        el.attr(BLOCK_ID_ATTR).and_then(|id| self.boxes.get(id))
    }

    /// Bounds of `el`, or a zero-size box at the origin with a warning.
    fn bounds_or_warn(&mut self, el: &Element, id: &str) -> BoundingBox {
        match self.measured(el) {
            Some(measured) => measured.bounds(),
            None => {
                self.warn(LayoutWarning::MeasurementMissing {
                    id: id.to_string(),
                    element: el.name.clone(),
                });
                BoundingBox::default()
            }
        }
    }

    fn measured_block(&mut self, el: &Element, kind: BlockKind, font: Option<f64>) -> Block {
        let id = self.id_of(el);
        let bounds = self.bounds_or_warn(el, &id);
        let mut block = Block::new(id, kind, bounds);
        block.style = resolve_style(el, self.measured(el), font);
        block
    }

    fn image_block(&mut self, img: &Element, wrapper: Option<&Element>) -> Block {
        // The image's own box wins; a wrapping paragraph is the fallback.
        let source = match wrapper {
            Some(p) if self.measured(img).is_none() && self.measured(p).is_some() => p,
            _ => img,
        };
        let id = self.id_of(source);
        let bounds = self.bounds_or_warn(source, &id);
        let scale = self
            .scale_request(img, &id)
            .or_else(|| wrapper.and_then(|p| self.scale_request(p, &id)));
        let src = img
            .attr("data-filepath")
            .or_else(|| img.attr("src"))
            .unwrap_or_default()
            .to_string();
        let kind = BlockKind::Image(ImageContent {
            src,
            alt: img.attr("alt").unwrap_or_default().to_string(),
            natural_size: bounds.size(),
            scale,
            fitted: false,
        });
        let mut block = Block::new(id, kind, bounds);
        block.style = resolve_style(img, self.measured(source), None);
        block
    }

    /// Parses `data-scale-type` with `data-scale-x` / `data-scale-y`.
    fn scale_request(&mut self, el: &Element, id: &str) -> Option<ScaleRequest> {
        let scale_type = el.attr("data-scale-type");
        let x = el.attr("data-scale-x");
        let y = el.attr("data-scale-y");
        if scale_type.is_none() && x.is_none() && y.is_none() {
            return None;
        }

        let (axis, attribute, value) = match scale_type.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t == "width" => (ScaleAxis::Width, "data-scale-x", x),
            Some(t) if t == "height" => (ScaleAxis::Height, "data-scale-y", y),
            Some(other) => {
                self.warn(LayoutWarning::MalformedScaleRequest {
                    id: id.to_string(),
                    attribute: "data-scale-type".to_string(),
                    value: other,
                });
                return None;
            }
            None if x.is_some() => (ScaleAxis::Width, "data-scale-x", x),
            None => (ScaleAxis::Height, "data-scale-y", y),
        };

        match value.and_then(parse_fraction) {
            Some(fraction) => Some(ScaleRequest { axis, fraction }),
            None => {
                self.warn(LayoutWarning::MalformedScaleRequest {
                    id: id.to_string(),
                    attribute: attribute.to_string(),
                    value: value.unwrap_or_default().to_string(),
                });
                None
            }
        }
    }

    fn list_block(&mut self, el: &Element) -> Block {
        let mut items = Vec::new();
        let mut item_bounds: Option<BoundingBox> = None;
        self.collect_list_items(el, 0, &mut items, &mut item_bounds);

        let id = self.id_of(el);
        let bounds = match (self.measured(el), item_bounds) {
            (Some(measured), _) => measured.bounds(),
            (None, Some(union)) => union,
            (None, None) => self.bounds_or_warn(el, &id),
        };
        let kind = BlockKind::List(ListContent {
            list_type: ListType::from_tag(&el.name).unwrap_or_default(),
            start: el.attr("start").and_then(|s| s.trim().parse().ok()),
            items,
        });
        let mut block = Block::new(id, kind, bounds);
        block.style = resolve_style(el, self.measured(el), Some(self.config.font_sizes.body));
        block
    }

    fn collect_list_items(
        &self,
        list: &Element,
        level: u8,
        items: &mut Vec<ListItem>,
        bounds: &mut Option<BoundingBox>,
    ) {
        for li in list.child_elements().filter(|c| c.is("li")) {
            let (text, html) = list_item_content(li);
            items.push(ListItem { level, text, html });
            if let Some(measured) = self.measured(li) {
                let b = measured.bounds();
                *bounds = Some(bounds.map_or(b, |u| u.union(&b)));
            }
            for nested in li.child_elements().filter(|c| c.is("ul") || c.is("ol")) {
                self.collect_list_items(nested, level.saturating_add(1), items, bounds);
            }
        }
    }

    fn table_block(&mut self, el: &Element) -> Block {
        let mut rows_el = Vec::new();
        el.find_all(|e| e.is("tr"), &mut rows_el);

        let rows: Vec<Vec<TableCell>> = rows_el
            .iter()
            .map(|tr| {
                tr.child_elements()
                    .filter(|c| c.is("th") || c.is("td"))
                    .map(|cell| TableCell {
                        text: cell.text(),
                        html: clean_inner_html(cell),
                        header: cell.is("th"),
                        align: cell
                            .attr("style")
                            .and_then(|s| inline_style_value(s, "text-align"))
                            .or_else(|| cell.attr("align"))
                            .and_then(Alignment::parse),
                    })
                    .collect()
            })
            .filter(|row: &Vec<TableCell>| !row.is_empty())
            .collect();

        let column_widths = rows_el.first().and_then(|tr| {
            tr.child_elements()
                .filter(|c| c.is("th") || c.is("td"))
                .map(|cell| self.measured(cell).map(|m| m.width))
                .collect::<Option<Vec<f64>>>()
                .filter(|widths| !widths.is_empty())
        });

        let id = self.id_of(el);
        let scale = self.scale_request(el, &id);
        let bounds = self.bounds_or_warn(el, &id);
        let kind = BlockKind::Table(TableContent {
            rows,
            column_widths,
            scale,
        });
        let mut block = Block::new(id, kind, bounds);
        block.style = resolve_style(el, self.measured(el), Some(self.config.font_sizes.body));
        block
    }

    fn admonition_block(&mut self, el: &Element) -> Block {
        let variant = el
            .classes()
            .find(|c| *c != "admonition")
            .unwrap_or("note")
            .to_string();
        let is_title = |e: &Element| e.has_class("admonition-title");
        let title = el.child_elements().find(|e| is_title(e)).map(Element::text);

        let mut body = el.clone();
        body.children
            .retain(|node| !node.as_element().is_some_and(|e| is_title(e)));
        let kind = BlockKind::Admonition {
            variant,
            title,
            text: body.text(),
            html: clean_inner_html(&body),
        };
        let font = self.config.font_sizes.body;
        self.measured_block(el, kind, Some(font))
    }

    /// `div.columns > div.column`; children are positioned relative to their
    /// column, columns relative to the container.
    fn columns_block(&mut self, el: &Element, slide: usize) -> Block {
        let mut container = self.measured_block(el, BlockKind::ColumnContainer, None);
        let origin = container.position;

        for column_el in el.child_elements().filter(|c| c.has_class("column")) {
            let width = column_el
                .attr("data-column-width")
                .map(ColumnWidth::parse)
                .unwrap_or_default();
            let mut column = self.measured_block(column_el, BlockKind::Column { width }, None);

            let mut children = Vec::new();
            self.walk(&column_el.children, slide, &mut children);
            children.retain(|child| !child.is_page_break());
            for child in &mut children {
                relativize(child, column.position);
            }
            column.children = children;
            relativize(&mut column, origin);
            container.children.push(column);
        }
        container
    }

    fn warn(&mut self, warning: LayoutWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn relativize(block: &mut Block, origin: Point) {
    block.position.x -= origin.x;
    block.position.y -= origin.y;
}

fn set_source_slide(block: &mut Block, slide: usize) {
    block.source_slide = slide;
    for child in &mut block.children {
        set_source_slide(child, slide);
    }
}

/// The `img` a paragraph consists of, if it holds nothing else (a wrapping
/// link is allowed).
fn sole_image(p: &Element) -> Option<&Element> {
    let mut content = p.children.iter().filter(|node| !node.is_blank());
    let only = content.next()?.as_element()?;
    if content.next().is_some() {
        return None;
    }
    if only.is("img") {
        return Some(only);
    }
    if only.is("a") {
        return sole_image(only);
    }
    None
}

/// Text and inline HTML of a list item, excluding nested lists.
fn list_item_content(li: &Element) -> (String, String) {
    let mut own = li.clone();
    own.children
        .retain(|node| !node.as_element().is_some_and(|e| e.is("ul") || e.is("ol")));
    // Loose lists wrap item text in a paragraph.
    let significant: Vec<&Node> = own.children.iter().filter(|n| !n.is_blank()).collect();
    if let [Node::Element(p)] = significant.as_slice() {
        if p.is("p") {
            return (p.text(), clean_inner_html(p));
        }
    }
    (own.text(), clean_inner_html(&own).trim().to_string())
}

/// `0.5`, `50%`; must land in `(0, 1]`.
fn parse_fraction(value: &str) -> Option<f64> {
    let value = value.trim();
    let fraction = match value.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => value.parse::<f64>().ok()?,
    };
    (fraction > 0.0 && fraction <= 1.0).then_some(fraction)
}

fn parse_font_weight(value: &str) -> Option<u16> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" | "bolder" => Some(700),
        "lighter" => Some(300),
        other => other.parse::<f64>().ok().map(|w| w.clamp(1.0, 1000.0) as u16),
    }
}

/// Computed style first, then inline style, then the theme font size.
fn resolve_style(el: &Element, measured: Option<&MeasuredBox>, font: Option<f64>) -> BlockStyle {
    let mut style = BlockStyle {
        classes: el.classes().map(str::to_string).collect(),
        font_size: font,
        ..BlockStyle::default()
    };

    if let Some(inline) = el.attr("style") {
        if let Some(color) = inline_style_value(inline, "color").and_then(Rgb::parse) {
            style.color = Some(color);
        }
        if let Some(bg) = inline_style_value(inline, "background-color")
            .or_else(|| inline_style_value(inline, "background"))
            .and_then(Rgb::parse)
        {
            style.background = Some(bg);
        }
        if let Some(align) = inline_style_value(inline, "text-align").and_then(Alignment::parse) {
            style.align = align;
        }
        if let Some(size) = inline_style_value(inline, "font-size").and_then(parse_px) {
            style.font_size = Some(size);
        }
        if let Some(weight) = inline_style_value(inline, "font-weight").and_then(parse_font_weight) {
            style.font_weight = Some(weight);
        }
    }

    if let Some(computed) = measured.and_then(|m| m.style.as_ref()) {
        apply_computed(&mut style, computed);
    }
    style
}

fn apply_computed(style: &mut BlockStyle, computed: &ComputedStyle) {
    if let Some(size) = computed.font_size.filter(|s| *s > 0.0) {
        style.font_size = Some(size);
    }
    if let Some(weight) = computed.font_weight.as_deref().and_then(parse_font_weight) {
        style.font_weight = Some(weight);
    }
    if let Some(font_style) = computed.font_style.as_deref() {
        style.italic = matches!(font_style.trim(), "italic" | "oblique");
    }
    if let Some(color) = computed.color.as_deref().and_then(Rgb::parse) {
        style.color = Some(color);
    }
    if let Some(bg) = computed.background_color.as_deref().and_then(Rgb::parse) {
        style.background = Some(bg);
    }
    if let Some(align) = computed.text_align.as_deref().and_then(Alignment::parse) {
        style.align = align;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Size;

    fn boxes(entries: &[(&str, f64, f64, f64, f64)]) -> BoxMap {
        entries
            .iter()
            .map(|(id, x, y, w, h)| (id.to_string(), MeasuredBox::new(*x, *y, *w, *h)))
            .collect()
    }

    fn build(html: &str, boxes: &BoxMap) -> BuiltBlocks {
        build_blocks(html, boxes, &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn builds_headings_and_paragraphs_with_measured_boxes() {
        let html = r#"<h1 data-bid="b0">Title</h1><p data-bid="b1">Some <strong>bold</strong> text</p>"#;
        let built = build(
            html,
            &boxes(&[("b0", 40.0, 40.0, 880.0, 48.0), ("b1", 40.0, 100.0, 880.0, 24.0)]),
        );
        assert!(built.warnings.is_empty());
        assert_eq!(built.blocks.len(), 2);

        let heading = &built.blocks[0];
        assert!(matches!(&heading.kind, BlockKind::Heading { level: 1, text, .. } if text == "Title"));
        assert_eq!(heading.height(), 48.0);
        assert_eq!(heading.style.font_size, Some(40.0));
        assert!(heading.style.is_bold());

        match &built.blocks[1].kind {
            BlockKind::Paragraph { text, html, quote } => {
                assert_eq!(text, "Some bold text");
                assert_eq!(html, "Some <strong>bold</strong> text");
                assert!(!quote);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(built.blocks[1].position, Point::new(40.0, 100.0));
    }

    #[test]
    fn merges_list_items_and_flattens_nesting() {
        let html = r#"<ul data-bid="b0"><li data-bid="b1">one</li><li data-bid="b2">two<ul data-bid="b3"><li data-bid="b4">nested</li></ul></li></ul>"#;
        let built = build(
            html,
            &boxes(&[
                ("b1", 60.0, 100.0, 800.0, 24.0),
                ("b2", 60.0, 124.0, 800.0, 48.0),
                ("b4", 80.0, 148.0, 780.0, 24.0),
            ]),
        );
        assert_eq!(built.blocks.len(), 1);
        let list = &built.blocks[0];
        match &list.kind {
            BlockKind::List(content) => {
                assert_eq!(content.list_type, ListType::Unordered);
                let items: Vec<(u8, &str)> = content
                    .items
                    .iter()
                    .map(|i| (i.level, i.text.as_str()))
                    .collect();
                assert_eq!(items, vec![(0, "one"), (0, "two"), (1, "nested")]);
            }
            other => panic!("unexpected {:?}", other),
        }
        // No container box: union of the item boxes.
        assert_eq!(list.position, Point::new(60.0, 100.0));
        assert_eq!(list.height(), 72.0);
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn stray_list_item_becomes_list_item_block() {
        let built = build(r#"<li data-bid="b0">alone</li>"#, &boxes(&[("b0", 0.0, 0.0, 100.0, 20.0)]));
        assert!(matches!(&built.blocks[0].kind, BlockKind::ListItem { level: 0, text, .. } if text == "alone"));
    }

    #[test]
    fn tables_become_grids_with_header_and_alignment() {
        let html = r#"<table data-bid="b0"><thead><tr><th data-bid="b1">Name</th><th data-bid="b2" style="text-align: right">Qty</th></tr></thead><tbody><tr><td data-bid="b3">Apple</td><td data-bid="b4" style="text-align: right">3</td></tr></tbody></table>"#;
        let built = build(
            html,
            &boxes(&[
                ("b0", 40.0, 40.0, 400.0, 60.0),
                ("b1", 40.0, 40.0, 300.0, 30.0),
                ("b2", 340.0, 40.0, 100.0, 30.0),
            ]),
        );
        let table = match &built.blocks[0].kind {
            BlockKind::Table(table) => table,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(table.rows.len(), 2);
        assert!(table.has_header());
        assert_eq!(table.rows[1][0].text, "Apple");
        assert_eq!(table.rows[1][1].align, Some(Alignment::End));
        assert_eq!(table.column_widths, Some(vec![300.0, 100.0]));
        assert_eq!(built.blocks[0].height(), 60.0);
    }

    #[test]
    fn image_paragraph_becomes_image_block_with_scale_request() {
        let html = r#"<p data-bid="b0"><img data-bid="b1" src="chart.png" alt="Chart" data-scale-type="width" data-scale-x="0.5" /></p>"#;
        let built = build(
            html,
            &boxes(&[("b0", 40.0, 40.0, 880.0, 300.0), ("b1", 40.0, 40.0, 600.0, 300.0)]),
        );
        let block = &built.blocks[0];
        assert_eq!(block.id, "b1");
        match &block.kind {
            BlockKind::Image(img) => {
                assert_eq!(img.src, "chart.png");
                assert_eq!(img.alt, "Chart");
                assert_eq!(
                    img.scale,
                    Some(ScaleRequest {
                        axis: ScaleAxis::Width,
                        fraction: 0.5
                    })
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_scale_request_is_ignored_with_warning() {
        let html = r#"<p data-bid="b0"><img data-bid="b1" src="a.png" data-scale-type="width" data-scale-x="huge" /></p>"#;
        let built = build(html, &boxes(&[("b1", 0.0, 0.0, 100.0, 100.0)]));
        assert!(matches!(&built.blocks[0].kind, BlockKind::Image(img) if img.scale.is_none()));
        assert_eq!(
            built.warnings,
            vec![LayoutWarning::MalformedScaleRequest {
                id: "b1".into(),
                attribute: "data-scale-x".into(),
                value: "huge".into()
            }]
        );
    }

    #[test]
    fn unknown_scale_axis_is_ignored_with_warning() {
        let html = r#"<p data-bid="b0"><img data-bid="b1" src="a.png" data-scale-type="Depth" data-scale-x="0.5" /></p>"#;
        let built = build(html, &boxes(&[("b1", 0.0, 0.0, 100.0, 100.0)]));
        assert!(matches!(&built.blocks[0].kind, BlockKind::Image(img) if img.scale.is_none()));
        assert_eq!(built.blocks[0].size, Size::new(100.0, 100.0));
        assert_eq!(
            built.warnings,
            vec![LayoutWarning::MalformedScaleRequest {
                id: "b1".into(),
                attribute: "data-scale-type".into(),
                value: "depth".into()
            }]
        );
    }

    #[test]
    fn scale_requests_inside_columns_are_consumed_by_pagination() {
        let html = r#"<div class="columns" data-bid="b0"><div class="column" data-bid="b1"><p data-bid="b2"><img data-bid="b3" src="a.png" data-scale-type="width" data-scale-x="0.5" /></p></div><div class="column" data-bid="b4"><p data-bid="b5">text</p></div></div>"#;
        let built = build(
            html,
            &boxes(&[
                ("b0", 40.0, 40.0, 880.0, 400.0),
                ("b1", 40.0, 40.0, 440.0, 400.0),
                ("b3", 40.0, 40.0, 400.0, 400.0),
                ("b4", 480.0, 40.0, 440.0, 24.0),
                ("b5", 480.0, 40.0, 440.0, 24.0),
            ]),
        );
        assert!(built.warnings.is_empty(), "{:?}", built.warnings);

        let deck = crate::layout::paginate(built.blocks, &LayoutConfig::default());
        let image = &deck.pages[0].blocks[0].children[0].children[0];
        assert_eq!(image.id, "b3");
        assert!((image.width() - 220.0).abs() < 1e-9);
        assert!((image.height() - 220.0).abs() < 1e-9);

        fn pending(block: &Block) -> bool {
            block.scale_request().is_some() || block.children.iter().any(pending)
        }
        assert!(!deck.blocks().any(pending));
    }

    #[test]
    fn missing_boxes_produce_zero_size_blocks_with_warnings() {
        let built = build(r#"<p data-bid="b0">a</p><p data-bid="b1">b</p>"#, &boxes(&[("b0", 0.0, 0.0, 10.0, 10.0)]));
        assert_eq!(built.blocks.len(), 2);
        assert!(built.blocks[1].size.is_zero());
        assert_eq!(
            built.warnings,
            vec![LayoutWarning::MeasurementMissing {
                id: "b1".into(),
                element: "p".into()
            }]
        );
    }

    #[test]
    fn columns_become_containers_with_relative_children() {
        let html = r#"<div class="columns" data-bid="b0"><div class="column" data-column-width="40%" data-bid="b1"><p data-bid="b2">left</p></div><div class="column" data-bid="b3"><p data-bid="b4">right</p></div></div>"#;
        let built = build(
            html,
            &boxes(&[
                ("b0", 40.0, 100.0, 880.0, 200.0),
                ("b1", 40.0, 100.0, 352.0, 200.0),
                ("b2", 40.0, 110.0, 352.0, 24.0),
                ("b3", 416.0, 100.0, 504.0, 200.0),
                ("b4", 416.0, 100.0, 504.0, 24.0),
            ]),
        );
        assert_eq!(built.blocks.len(), 1);
        let container = &built.blocks[0];
        assert!(matches!(container.kind, BlockKind::ColumnContainer));
        assert_eq!(container.children.len(), 2);
        let left = &container.children[0];
        assert!(matches!(left.kind, BlockKind::Column { width: ColumnWidth::Percent(p) } if p == 40.0));
        assert_eq!(left.position, Point::new(0.0, 0.0));
        assert_eq!(left.children[0].position, Point::new(0.0, 10.0));
        let right = &container.children[1];
        assert_eq!(right.position, Point::new(376.0, 0.0));
        assert_eq!(right.text(), "right");
    }

    #[test]
    fn slides_become_page_breaks_and_source_indexes() {
        let html = r#"<html><head><style>p { margin: 0 }</style></head><body>
            <div class="slide" id="slide-0"><h1 data-bid="b0">One</h1></div>
            <div class="page-break" data-bid="b1"></div>
            <div class="slide" id="slide-1"><pre data-bid="b2"><code class="language-rust">fn main() {}
</code></pre><blockquote data-bid="b3"><p>quoted</p></blockquote></div>
        </body></html>"#;
        let built = build(
            html,
            &boxes(&[
                ("b0", 40.0, 40.0, 880.0, 48.0),
                ("b2", 40.0, 40.0, 880.0, 30.0),
                ("b3", 40.0, 70.0, 880.0, 30.0),
            ]),
        );
        let kinds: Vec<&str> = built.blocks.iter().map(|b| b.kind.name()).collect();
        assert_eq!(kinds, vec!["heading", "page-break", "code", "paragraph"]);
        assert_eq!(built.blocks[0].source_slide, 0);
        assert_eq!(built.blocks[2].source_slide, 1);
        assert!(matches!(
            &built.blocks[2].kind,
            BlockKind::Code { language: Some(lang), text } if lang == "rust" && text == "fn main() {}"
        ));
        assert!(matches!(&built.blocks[3].kind, BlockKind::Paragraph { quote: true, text, .. } if text == "quoted"));
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn admonitions_and_math() {
        let html = r#"<div class="admonition warning" data-bid="b0"><p class="admonition-title" data-bid="b1">Careful</p><p data-bid="b2">Hot surface</p></div><div class="math" data-bid="b3">E = mc^2</div>"#;
        let built = build(
            html,
            &boxes(&[("b0", 40.0, 40.0, 880.0, 80.0), ("b3", 40.0, 120.0, 880.0, 40.0)]),
        );
        match &built.blocks[0].kind {
            BlockKind::Admonition {
                variant,
                title,
                text,
                ..
            } => {
                assert_eq!(variant, "warning");
                assert_eq!(title.as_deref(), Some("Careful"));
                assert_eq!(text, "Hot surface");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&built.blocks[1].kind, BlockKind::Math { tex, display: true } if tex == "E = mc^2"));
    }

    #[test]
    fn computed_style_overrides_theme_defaults() {
        let mut map = boxes(&[("b0", 0.0, 0.0, 100.0, 20.0)]);
        map["b0"].style = Some(ComputedStyle {
            font_size: Some(18.0),
            font_weight: Some("bold".into()),
            font_style: Some("italic".into()),
            color: Some("rgb(255, 0, 0)".into()),
            background_color: Some("rgba(0, 0, 0, 0)".into()),
            text_align: Some("center".into()),
        });
        let built = build(r#"<p data-bid="b0" class="lead">x</p>"#, &map);
        let style = &built.blocks[0].style;
        assert_eq!(style.font_size, Some(18.0));
        assert!(style.is_bold());
        assert!(style.italic);
        assert_eq!(style.color, Some(Rgb::new(255, 0, 0)));
        assert_eq!(style.background, None);
        assert_eq!(style.align, Alignment::Center);
        assert!(style.has_class("lead"));
    }
}

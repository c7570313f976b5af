//! A crude flow layout standing in for a browser: blocks stack vertically,
//! text wraps at ten pixels per character, images are 320x240.

#![allow(dead_code)]

use slidemark::html::{self, Element, Node};
use slidemark::{BoxMap, MeasureError, MeasuredBox, Viewport};

pub const MARGIN: f64 = 40.0;
pub const LINE: f64 = 24.0;
pub const IMAGE_WIDTH: f64 = 320.0;
pub const IMAGE_HEIGHT: f64 = 240.0;

const HEADING_LINES: [f64; 6] = [48.0, 40.0, 34.0, 30.0, 26.0, 24.0];

fn text_lines(text: &str, width: f64) -> f64 {
    let per_line = (width / 10.0).floor().max(1.0);
    text.lines()
        .map(|line| (line.chars().count() as f64 / per_line).ceil().max(1.0))
        .sum::<f64>()
        .max(1.0)
}

fn contains_image(el: &Element) -> bool {
    el.find(|e| e.is("img")).is_some()
}

struct Flow {
    boxes: BoxMap,
}

impl Flow {
    fn record(&mut self, el: &Element, x: f64, y: f64, width: f64, height: f64) {
        if let Some(id) = el.attr("data-bid") {
            self.boxes
                .insert(id.to_string(), MeasuredBox::new(x, y, width, height));
        }
    }

    fn children(&mut self, nodes: &[Node], x: f64, y: f64, width: f64) -> f64 {
        let mut offset = 0.0;
        for el in nodes.iter().filter_map(Node::as_element) {
            offset += self.element(el, x, y + offset, width);
        }
        offset
    }

    fn list(&mut self, list: &Element, x: f64, y: f64, width: f64) -> f64 {
        let mut offset = 0.0;
        for li in list.child_elements().filter(|c| c.is("li")) {
            let own_text: String = li
                .children
                .iter()
                .filter(|n| !matches!(n, Node::Element(e) if e.is("ul") || e.is("ol")))
                .map(|n| match n {
                    Node::Text(t) => t.clone(),
                    Node::Element(e) => e.text(),
                    Node::Comment(_) => String::new(),
                })
                .collect();
            let mut height = text_lines(own_text.trim(), width) * LINE;
            for nested in li.child_elements().filter(|c| c.is("ul") || c.is("ol")) {
                height += self.list(nested, x + 24.0, y + offset + height, width - 24.0);
            }
            self.record(li, x, y + offset, width, height);
            offset += height;
        }
        offset
    }

    fn element(&mut self, el: &Element, x: f64, y: f64, width: f64) -> f64 {
        let mut box_width = width;
        let height = if let Some(level) = el.heading_level() {
            HEADING_LINES[usize::from(level) - 1] * text_lines(&el.text(), width)
        } else {
            match el.name.as_str() {
                "img" => {
                    box_width = IMAGE_WIDTH;
                    IMAGE_HEIGHT
                }
                "p" if contains_image(el) => {
                    if let Some(img) = el.find(|e| e.is("img")) {
                        self.record(img, x, y, IMAGE_WIDTH, IMAGE_HEIGHT);
                    }
                    box_width = IMAGE_WIDTH;
                    IMAGE_HEIGHT
                }
                "p" | "blockquote" => text_lines(&el.text(), width) * LINE,
                "ul" | "ol" => self.list(el, x, y, width),
                "pre" => el.text_content().trim_end().lines().count().max(1) as f64 * 19.0 + 16.0,
                "table" => {
                    let mut rows = Vec::new();
                    el.find_all(|e| e.is("tr"), &mut rows);
                    if let Some(first) = rows.first() {
                        let cells: Vec<&Element> = first
                            .child_elements()
                            .filter(|c| c.is("th") || c.is("td"))
                            .collect();
                        let cell_width = width / cells.len().max(1) as f64;
                        for (i, cell) in cells.iter().enumerate() {
                            self.record(cell, x + i as f64 * cell_width, y, cell_width, 32.0);
                        }
                    }
                    rows.len() as f64 * 32.0
                }
                "div" if el.has_class("math") => 48.0,
                "div" if el.has_class("page-break") => 0.0,
                "div" if el.has_class("admonition") => text_lines(&el.text(), width) * LINE + 16.0,
                "div" if el.has_class("columns") => {
                    let columns: Vec<&Element> =
                        el.child_elements().filter(|c| c.has_class("column")).collect();
                    let column_width = width / columns.len().max(1) as f64;
                    let mut tallest: f64 = 0.0;
                    for (i, column) in columns.iter().enumerate() {
                        let cx = x + i as f64 * column_width;
                        let h = self.children(&column.children, cx, y, column_width);
                        self.record(column, cx, y, column_width, h);
                        tallest = tallest.max(h);
                    }
                    tallest
                }
                _ => return self.children(&el.children, x, y, width),
            }
        };
        self.record(el, x, y, box_width, height);
        height
    }
}

/// Boxes for every tracked element of `html` laid out in a viewport `width` wide.
pub fn estimate_boxes(html: &str, width: f64) -> BoxMap {
    let nodes = html::parse(html).unwrap_or_default();
    let mut flow = Flow {
        boxes: BoxMap::new(),
    };
    flow.children(&nodes, MARGIN, MARGIN, width - 2.0 * MARGIN);
    flow.boxes
}

/// A measurer closure backed by [`estimate_boxes`].
pub fn flow_measurer() -> impl FnMut(&str, Viewport) -> Result<BoxMap, MeasureError> {
    |html: &str, viewport: Viewport| Ok(estimate_boxes(html, viewport.width))
}

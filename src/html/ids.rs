// src/html/ids.rs

use super::{Element, Node};
use crate::measure::BLOCK_ID_ATTR;

/// Hands out `b0`, `b1`, ... in document order.
#[derive(Debug, Clone, Default)]
pub struct BlockIdAllocator {
    next: usize,
}

impl BlockIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("b{}", self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

/// Whether the layout engine needs a measured box for this element.
pub fn is_tracked(el: &Element) -> bool {
    match el.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "ul" | "ol" | "li" | "pre" | "table"
        | "th" | "td" | "img" | "blockquote" => true,
        "div" => {
            el.has_class("columns")
                || el.has_class("column")
                || el.has_class("admonition")
                || el.has_class("math")
                || el.has_class("page-break")
        }
        _ => false,
    }
}

/// Gives every tracked element without a `data-bid` a fresh id, depth first.
/// Existing ids are kept. Returns the number of ids assigned.
pub fn assign_block_ids(nodes: &mut [Node], ids: &mut BlockIdAllocator) -> usize {
    let mut assigned = 0;
    for node in nodes.iter_mut() {
        if let Some(el) = node.as_element_mut() {
            if is_tracked(el) && el.attr(BLOCK_ID_ATTR).is_none() {
                el.set_attr(BLOCK_ID_ATTR, ids.next_id());
                assigned += 1;
            }
            assigned += assign_block_ids(&mut el.children, ids);
        }
    }
    assigned
}

/// Removes every `data-bid`, leaving markup fit for renderers.
pub fn strip_block_ids(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        if let Some(el) = node.as_element_mut() {
            el.attrs.shift_remove(BLOCK_ID_ATTR);
            strip_block_ids(&mut el.children);
        }
    }
}

/// Inner HTML of `el` with ids removed.
pub fn clean_inner_html(el: &Element) -> String {
    let mut children = el.children.clone();
    strip_block_ids(&mut children);
    super::to_html(&children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse, parse_element, to_html};

    #[test]
    fn strips_ids_from_inner_html() {
        let el = parse_element(r#"<p data-bid="b0">a <img data-bid="b1" src="x.png" /></p>"#).unwrap();
        assert_eq!(clean_inner_html(&el), "a <img src=\"x.png\" />");
    }

    #[test]
    fn numbers_tracked_elements_in_document_order() {
        let mut nodes = parse("<h1>T</h1><ul><li>a <em>x</em></li><li>b</li></ul><span>s</span>").unwrap();
        let mut ids = BlockIdAllocator::new();
        assert_eq!(assign_block_ids(&mut nodes, &mut ids), 4);
        assert_eq!(
            to_html(&nodes),
            "<h1 data-bid=\"b0\">T</h1><ul data-bid=\"b1\"><li data-bid=\"b2\">a <em>x</em></li><li data-bid=\"b3\">b</li></ul><span>s</span>"
        );
    }

    #[test]
    fn keeps_existing_ids_and_continues_numbering() {
        let mut nodes = parse(r#"<p data-bid="intro">a</p><div class="math">x</div><div>plain</div>"#).unwrap();
        let mut ids = BlockIdAllocator::new();
        ids.next_id();
        assign_block_ids(&mut nodes, &mut ids);
        assert_eq!(nodes[0].as_element().unwrap().attr("data-bid"), Some("intro"));
        assert_eq!(nodes[1].as_element().unwrap().attr("data-bid"), Some("b1"));
        assert_eq!(nodes[2].as_element().unwrap().attr("data-bid"), None);
        assert_eq!(ids.count(), 2);
    }
}

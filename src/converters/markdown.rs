use crate::models::{
    block::{Block, BlockKind},
    list::{ListContent, ListType},
    page::{Deck, Page},
};
use std::cmp::Ordering;
use std::fmt::Write;

// --- Helper Function for Sorting ---
/// Compares two blocks by their vertical position on the page.
fn compare_blocks_by_y(a: &Block, b: &Block) -> Ordering {
    a.position
        .y
        .partial_cmp(&b.position.y)
        .unwrap_or(Ordering::Equal)
}

// --- Text Extraction Logic ---
fn extract_text_from_list(list: &ListContent) -> String {
    let mut number = list.start.unwrap_or(1);
    list.items
        .iter()
        .map(|item| {
            let indent = "  ".repeat(usize::from(item.level));
            let marker = match list.list_type {
                ListType::Ordered if item.level == 0 => {
                    let marker = format!("{}.", number);
                    number += 1;
                    marker
                }
                _ => "-".to_string(),
            };
            format!("{}{} {}", indent, marker, item.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outline text of one block, `None` for blocks with nothing to show.
fn extract_text_from_block(block: &Block) -> Option<String> {
    let text = match &block.kind {
        BlockKind::Heading { level, text, .. } => {
            // Slide headers use `##`, so block headings start one level below.
            let hashes = "#".repeat(usize::from(*level).saturating_add(2).min(6));
            format!("{} {}", hashes, text)
        }
        BlockKind::Paragraph { text, quote, .. } => {
            if *quote {
                text.lines()
                    .map(|line| format!("> {}", line))
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                text.clone()
            }
        }
        BlockKind::List(list) => extract_text_from_list(list),
        BlockKind::ListItem { level, text, .. } => {
            format!("{}- {}", "  ".repeat(usize::from(*level)), text)
        }
        BlockKind::Code { language, text } => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or(""),
            text.trim_end_matches('\n')
        ),
        BlockKind::Image(image) => format!("![{}]({})", image.alt, image.src),
        BlockKind::Table(table) => table
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<&str> = row.iter().map(|cell| cell.text.trim()).collect();
                format!("| {} |", cells.join(" | "))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        BlockKind::Math { tex, .. } => format!("$$ {} $$", tex.trim()),
        BlockKind::Admonition {
            variant,
            title,
            text,
            ..
        } => {
            let header = title.as_deref().unwrap_or(variant.as_str());
            format!("> **{}** {}", header, text)
        }
        BlockKind::ColumnContainer | BlockKind::Column { .. } => {
            let mut children: Vec<&Block> = block.children.iter().collect();
            if matches!(block.kind, BlockKind::Column { .. }) {
                children.sort_by(|a, b| compare_blocks_by_y(a, b));
            }
            children
                .into_iter()
                .filter_map(extract_text_from_block)
                .collect::<Vec<_>>()
                .join("\n")
        }
        BlockKind::PageBreak => return None,
    };
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn extract_text_from_page(page: &Page) -> Option<String> {
    let mut sorted_blocks: Vec<&Block> = page.blocks.iter().collect();
    sorted_blocks.sort_by(|a, b| compare_blocks_by_y(a, b));

    let page_parts: Vec<String> = sorted_blocks
        .into_iter()
        .filter_map(extract_text_from_block)
        .collect();

    if page_parts.is_empty() {
        None
    } else {
        Some(page_parts.join("\n"))
    }
}

// --- Public API Function ---

/// Renders a deck as a markdown outline: a `## Slide n` section per page with
/// the text of its blocks in vertical order.
///
/// Pages without any text are skipped; numbering still follows page order.
pub fn extract_text_from_deck(deck: &Deck) -> String {
    let mut full_text = String::new();
    let mut first_page = true;

    for page in &deck.pages {
        let Some(page_content) = extract_text_from_page(page) else {
            continue;
        };
        if !first_page {
            full_text.push_str("\n---\n\n");
        }
        first_page = false;

        // Writing to a String cannot fail.
        let _ = writeln!(full_text, "## Slide {}\n", page.index + 1);
        let _ = writeln!(full_text, "{}", page_content);
    }

    full_text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::models::common::BoundingBox;
    use crate::models::list::ListItem;

    fn block(id: &str, y: f64, kind: BlockKind) -> Block {
        Block::new(id, kind, BoundingBox::new(40.0, y, 880.0, 30.0))
    }

    fn paragraph(id: &str, y: f64, text: &str) -> Block {
        block(
            id,
            y,
            BlockKind::Paragraph {
                text: text.into(),
                html: text.into(),
                quote: false,
            },
        )
    }

    fn page(index: usize, blocks: Vec<Block>) -> Page {
        Page {
            index,
            blocks,
            content_height: 0.0,
            overflow: false,
        }
    }

    #[test]
    fn outlines_pages_in_vertical_order() {
        let deck = Deck {
            pages: vec![
                page(
                    0,
                    vec![
                        paragraph("b1", 100.0, "second"),
                        block(
                            "b0",
                            40.0,
                            BlockKind::Heading {
                                level: 1,
                                text: "Title".into(),
                                html: "Title".into(),
                            },
                        ),
                    ],
                ),
                page(1, vec![paragraph("b2", 40.0, "next page")]),
            ],
            warnings: Vec::new(),
            config: LayoutConfig::default(),
        };

        let outline = extract_text_from_deck(&deck);
        assert_eq!(
            outline,
            "## Slide 1\n\n### Title\nsecond\n\n---\n\n## Slide 2\n\nnext page\n"
        );
    }

    #[test]
    fn numbers_ordered_lists_and_indents_nested_items() {
        let list = block(
            "b0",
            40.0,
            BlockKind::List(ListContent {
                list_type: ListType::Ordered,
                start: Some(3),
                items: vec![
                    ListItem {
                        level: 0,
                        text: "three".into(),
                        html: "three".into(),
                    },
                    ListItem {
                        level: 1,
                        text: "nested".into(),
                        html: "nested".into(),
                    },
                    ListItem {
                        level: 0,
                        text: "four".into(),
                        html: "four".into(),
                    },
                ],
            }),
        );
        assert_eq!(
            extract_text_from_block(&list).unwrap(),
            "3. three\n  - nested\n4. four"
        );
    }

    #[test]
    fn skips_pages_without_text() {
        let deck = Deck {
            pages: vec![
                page(0, vec![paragraph("b0", 40.0, "   ")]),
                page(1, vec![paragraph("b1", 40.0, "only")]),
            ],
            warnings: Vec::new(),
            config: LayoutConfig::default(),
        };
        assert_eq!(extract_text_from_deck(&deck), "## Slide 2\n\nonly\n");
    }
}

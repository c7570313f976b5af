// src/layout/paginate.rs

use std::collections::VecDeque;

use crate::config::LayoutConfig;
use crate::errors::LayoutWarning;
use crate::layout::scaling::{
    fit_to_remaining, min_fit_height, requested_size, requested_size_within, FitOutcome, EPSILON,
};
use crate::models::block::{Block, BlockKind};
use crate::models::common::Size;
use crate::models::page::{Deck, Page};

/// Assigns measured blocks to pages.
///
/// Greedy and order preserving: a block joins the current page while the
/// page's content height plus spacing plus the block stays within the page
/// budget. Page-break markers close the page and are not placed. A block
/// taller than the budget, even after scaling, gets a page of its own. Images
/// and tables carrying a scale request are sized when the walk reaches them.
pub fn paginate(blocks: Vec<Block>, config: &LayoutConfig) -> Deck {
    let mut paginator = Paginator::new(config);
    let mut queue: VecDeque<Block> = blocks.into();
    while let Some(block) = queue.pop_front() {
        paginator.push(block, queue.front());
    }
    paginator.finish()
}

struct Paginator<'a> {
    config: &'a LayoutConfig,
    budget: f64,
    pages: Vec<Page>,
    current: Vec<Block>,
    height: f64,
    warnings: Vec<LayoutWarning>,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a LayoutConfig) -> Self {
        Paginator {
            config,
            budget: config.page_budget(),
            pages: Vec::new(),
            current: Vec::new(),
            height: 0.0,
            warnings: Vec::new(),
        }
    }

    fn push(&mut self, mut block: Block, next: Option<&Block>) {
        if block.is_page_break() {
            self.close_page();
            return;
        }

        self.scale(&mut block);

        if block.height() > self.budget + EPSILON {
            self.close_page();
            self.warn(LayoutWarning::OverflowingBlock {
                id: block.id.clone(),
                height: block.height(),
                budget: self.budget,
            });
            block.position.y = self.config.margin;
            let height = block.height();
            self.pages.push(Page {
                index: self.pages.len(),
                blocks: vec![block],
                content_height: height,
                overflow: true,
            });
            return;
        }

        if self.fits(block.height()) {
            if self.should_keep_with_next(&block, next) {
                log::debug!("Moving heading '{}' to the next page with its content", block.id);
                self.close_page();
            }
        } else {
            self.close_page();
        }
        self.place(block);
    }

    /// Space left for the next block on the current page, spacing included.
    fn remaining(&self) -> f64 {
        if self.current.is_empty() {
            self.budget
        } else {
            self.budget - self.height - self.config.block_spacing
        }
    }

    fn fits(&self, height: f64) -> bool {
        height <= self.remaining() + EPSILON
    }

    /// One-block lookahead: a heading that fits here but whose following block
    /// would not, while both would fit together on a fresh page, opens the
    /// next page instead.
    fn should_keep_with_next(&self, heading: &Block, next: Option<&Block>) -> bool {
        if !self.config.keep_headings_with_content || !heading.is_heading() || self.current.is_empty() {
            return false;
        }
        let Some(next) = next else {
            return false;
        };
        if next.is_heading() || next.is_page_break() {
            return false;
        }
        let spacing = self.config.block_spacing;
        let next_height = self.projected_height(next);
        let after_heading =
            self.height + spacing + heading.height() + spacing + next_height;
        let on_fresh_page = heading.height() + spacing + next_height;
        after_heading > self.budget + EPSILON && on_fresh_page <= self.budget + EPSILON
    }

    /// Least height `block` can occupy when placed, as the lookahead sees it.
    fn projected_height(&self, block: &Block) -> f64 {
        match block.scale_request() {
            Some(request) => {
                let size = requested_size(block.size, request, self.config);
                min_fit_height(size, self.config.min_image_height).min(self.budget)
            }
            None if is_image(block) => block.height().min(self.budget),
            None => block.height(),
        }
    }

    fn scale(&mut self, block: &mut Block) {
        if matches!(block.kind, BlockKind::ColumnContainer) {
            scale_column_children(block, self.config);
            return;
        }
        let Some(request) = block.scale_request() else {
            if is_image(block) && block.height() > self.budget + EPSILON {
                let size = block.size.scaled(self.budget / block.height());
                apply_size(block, size, true);
            }
            return;
        };
        let requested = requested_size(block.size, request, self.config);

        let min_height = self.config.min_image_height;
        let mut outcome = fit_to_remaining(requested, self.remaining(), min_height);
        if outcome == FitOutcome::Defer && !self.current.is_empty() {
            self.warn(LayoutWarning::ImageDeferred {
                id: block.id.clone(),
                remaining: self.remaining(),
            });
            self.close_page();
            outcome = fit_to_remaining(requested, self.remaining(), min_height);
        }

        let (size, fitted) = match outcome {
            FitOutcome::Fits(size) => (size, false),
            FitOutcome::Fitted(size) => (size, true),
            // Budget below the minimum image height; leave it to overflow.
            FitOutcome::Defer => (requested, false),
        };
        apply_size(block, size, fitted);
    }

    fn place(&mut self, mut block: Block) {
        let offset = if self.current.is_empty() {
            0.0
        } else {
            self.height + self.config.block_spacing
        };
        block.position.y = self.config.margin + offset;
        self.height = offset + block.height();
        self.current.push(block);
    }

    fn close_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let blocks = std::mem::take(&mut self.current);
        self.pages.push(Page {
            index: self.pages.len(),
            blocks,
            content_height: self.height,
            overflow: false,
        });
        self.height = 0.0;
    }

    fn warn(&mut self, warning: LayoutWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn finish(mut self) -> Deck {
        self.close_page();
        log::debug!(
            "Paginated into {} pages with a {:.1}px budget",
            self.pages.len(),
            self.budget
        );
        Deck {
            pages: self.pages,
            warnings: self.warnings,
            config: self.config.clone(),
        }
    }
}

fn is_image(block: &Block) -> bool {
    matches!(block.kind, BlockKind::Image(_))
}

/// Sizes the scalable blocks inside a column layout. Width requests resolve
/// against the column's measured width (the page's available width when the
/// column was not measured), height requests against the page budget. The
/// container keeps its measured size.
fn scale_column_children(container: &mut Block, config: &LayoutConfig) {
    let budget = config.page_budget();
    for column in &mut container.children {
        let width = if column.width() > 0.0 {
            column.width()
        } else {
            config.available_width()
        };
        for child in &mut column.children {
            if matches!(child.kind, BlockKind::ColumnContainer) {
                scale_column_children(child, config);
                continue;
            }
            let Some(request) = child.scale_request() else {
                continue;
            };
            let size = requested_size_within(child.size, request, width, budget);
            if size.height > budget + EPSILON {
                apply_size(child, size.scaled(budget / size.height), true);
            } else {
                apply_size(child, size, false);
            }
        }
    }
}

/// Applies the final size and consumes the scale request. Table column widths
/// follow the table's width.
fn apply_size(block: &mut Block, size: Size, fitted: bool) {
    let factor = if block.width() > 0.0 {
        size.width / block.width()
    } else {
        1.0
    };
    block.size = size;
    match &mut block.kind {
        BlockKind::Image(image) => {
            image.scale = None;
            image.fitted = fitted;
        }
        BlockKind::Table(table) => {
            table.scale = None;
            if let Some(widths) = table.column_widths.as_mut() {
                for width in widths.iter_mut() {
                    *width *= factor;
                }
            }
        }
        _ => {}
    }
}

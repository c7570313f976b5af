use proptest::prelude::*;

use slidemark::models::{BoundingBox, ImageContent, ScaleAxis, ScaleRequest, Size};
use slidemark::{paginate, Block, BlockKind, LayoutConfig};

#[derive(Debug, Clone)]
enum Shape {
    Paragraph(f64),
    Heading(f64),
    Image(f64, f64, Option<(bool, f64)>),
    Break,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        6 => (1.0..700.0f64).prop_map(Shape::Paragraph),
        2 => (20.0..80.0f64).prop_map(Shape::Heading),
        3 => (
            10.0..1200.0f64,
            10.0..900.0f64,
            proptest::option::of((any::<bool>(), 0.05..=1.0f64))
        )
            .prop_map(|(w, h, scale)| Shape::Image(w, h, scale)),
        1 => Just(Shape::Break),
    ]
}

fn to_block(index: usize, shape: &Shape) -> Block {
    let id = format!("b{}", index);
    let text = |t: &str| t.to_string();
    match *shape {
        Shape::Paragraph(h) => Block::new(
            id,
            BlockKind::Paragraph {
                text: text("p"),
                html: text("p"),
                quote: false,
            },
            BoundingBox::new(40.0, 0.0, 880.0, h),
        ),
        Shape::Heading(h) => Block::new(
            id,
            BlockKind::Heading {
                level: 2,
                text: text("h"),
                html: text("h"),
            },
            BoundingBox::new(40.0, 0.0, 880.0, h),
        ),
        Shape::Image(w, h, scale) => Block::new(
            id,
            BlockKind::Image(ImageContent {
                src: text("img.png"),
                alt: String::new(),
                natural_size: Size::new(w, h),
                scale: scale.map(|(width, fraction)| ScaleRequest {
                    axis: if width { ScaleAxis::Width } else { ScaleAxis::Height },
                    fraction,
                }),
                fitted: false,
            }),
            BoundingBox::new(40.0, 0.0, w, h),
        ),
        Shape::Break => Block::page_break(id, 0),
    }
}

fn blocks_strategy() -> impl Strategy<Value = Vec<Block>> {
    proptest::collection::vec(shape_strategy(), 0..40).prop_map(|shapes| {
        shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| to_block(i, shape))
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = LayoutConfig> {
    (0.0..24.0f64, any::<bool>()).prop_map(|(spacing, keep)| LayoutConfig {
        block_spacing: spacing,
        keep_headings_with_content: keep,
        ..LayoutConfig::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn preserves_block_order(blocks in blocks_strategy(), config in config_strategy()) {
        let expected: Vec<String> = blocks
            .iter()
            .filter(|b| !b.is_page_break())
            .map(|b| b.id.clone())
            .collect();
        let deck = paginate(blocks, &config);
        let placed: Vec<String> = deck.blocks().map(|b| b.id.clone()).collect();
        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn respects_the_budget_unless_overflowing(
        blocks in blocks_strategy(),
        config in config_strategy(),
    ) {
        let budget = config.page_budget();
        let deck = paginate(blocks, &config);
        for page in &deck.pages {
            prop_assert!(!page.is_empty(), "page {} is empty", page.index);
            if page.overflow {
                prop_assert_eq!(page.len(), 1);
            } else {
                prop_assert!(
                    page.content_height <= budget + 1e-5,
                    "page {} holds {}px of a {}px budget",
                    page.index,
                    page.content_height,
                    budget
                );
            }
            for block in &page.blocks {
                prop_assert!(block.position.y + 1e-6 >= config.margin);
            }
        }
    }

    #[test]
    fn scaling_preserves_aspect_ratio(blocks in blocks_strategy(), config in config_strategy()) {
        let natural: Vec<Option<f64>> = blocks
            .iter()
            .filter(|b| !b.is_page_break())
            .map(|b| match &b.kind {
                BlockKind::Image(image) => image.natural_size.aspect_ratio(),
                _ => None,
            })
            .collect();
        let deck = paginate(blocks, &config);
        for (block, ratio) in deck.blocks().zip(natural) {
            if let (Some(expected), Some(actual)) = (ratio, block.size.aspect_ratio()) {
                prop_assert!((expected - actual).abs() <= 1e-6 * expected.max(1.0));
            }
            prop_assert!(block.scale_request().is_none());
        }
    }

    #[test]
    fn is_deterministic(blocks in blocks_strategy(), config in config_strategy()) {
        let first = paginate(blocks.clone(), &config);
        let second = paginate(blocks, &config);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn three_tall_blocks_take_three_pages() {
    let config = LayoutConfig::with_budget(960.0, 500.0);
    let blocks = (0..3)
        .map(|i| to_block(i, &Shape::Paragraph(300.0)))
        .collect();
    let deck = paginate(blocks, &config);
    assert_eq!(deck.page_count(), 3);
    assert!(deck.pages.iter().all(|p| p.len() == 1 && !p.overflow));
}

#[test]
fn page_break_splits_short_blocks() {
    let config = LayoutConfig::with_budget(960.0, 1000.0);
    let blocks = vec![
        to_block(0, &Shape::Paragraph(100.0)),
        to_block(1, &Shape::Break),
        to_block(2, &Shape::Paragraph(100.0)),
    ];
    let deck = paginate(blocks, &config);
    assert_eq!(deck.page_count(), 2);
    assert_eq!(deck.pages[1].blocks[0].id, "b2");
}

// demos/paginate_markdown.rs
//
// Usage:
//   paginate_markdown <slides.md>                 writes <slides.md>.html for measuring
//   paginate_markdown <slides.md> <boxes.json>    lays out with a recorded box map
//   SLIDEMARK_MEASURER=<program> paginate_markdown <slides.md>
//                                                 measures with an external renderer

use std::{env, fs};

use anyhow::{bail, Context, Result};
use slidemark::measure::DOM_QUERY_SCRIPT;
use slidemark::{
    extract_text_from_deck, CommandMeasurer, Deck, LayoutConfig, LayoutEngine, Measurer,
    RecordedMeasurer, Source,
};

fn lay_out<M: Measurer>(measurer: M, markdown: &str) -> Result<Deck> {
    let mut engine = LayoutEngine::new(measurer, LayoutConfig::default());
    engine
        .measure_and_paginate(Source::Markdown(markdown))
        .context("layout failed")
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(markdown_path) = args.first() else {
        bail!("usage: paginate_markdown <slides.md> [boxes.json]");
    };
    let markdown = fs::read_to_string(markdown_path)
        .with_context(|| format!("reading {}", markdown_path))?;

    let deck = if let Some(boxes_path) = args.get(1) {
        log::info!("Replaying measurements from {}", boxes_path);
        lay_out(RecordedMeasurer::from_file(boxes_path)?, &markdown)?
    } else if let Ok(program) = env::var("SLIDEMARK_MEASURER") {
        log::info!("Measuring with {}", program);
        lay_out(CommandMeasurer::new(program), &markdown)?
    } else {
        let engine = LayoutEngine::new(RecordedMeasurer::default(), LayoutConfig::default());
        let html = engine.document(Source::Markdown(&markdown))?;
        let html_path = format!("{}.html", markdown_path);
        fs::write(&html_path, html)?;
        log::info!("No measurements given; wrote {}", html_path);
        println!("Load {} in a browser and evaluate:\n\n{}", html_path, DOM_QUERY_SCRIPT);
        return Ok(());
    };

    for page in &deck.pages {
        println!(
            "page {:>2}: {:>2} blocks, {:>6.1}px{}",
            page.index + 1,
            page.len(),
            page.content_height,
            if page.overflow { " (overflow)" } else { "" }
        );
    }
    for warning in &deck.warnings {
        log::warn!("{}", warning);
    }
    println!("\n{}", extract_text_from_deck(&deck));

    fs::write("deck.json", serde_json::to_string_pretty(&deck)?)?;
    log::info!("Deck saved to deck.json");
    Ok(())
}

// demos/svg_preview.rs
//
// Usage: svg_preview [deck.json]

use std::{env, fs};

use anyhow::{Context, Result};
use slidemark::{convert_deck_to_svg, Deck};

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let deck_path = env::args().nth(1).unwrap_or_else(|| "deck.json".to_string());
    log::info!("Loading deck from {}...", deck_path);
    let json = fs::read_to_string(&deck_path).with_context(|| format!("reading {}", deck_path))?;
    let deck: Deck = serde_json::from_str(&json).context("deck JSON is invalid")?;

    let svg_pages = convert_deck_to_svg(&deck)?;
    log::info!("SVG conversion successful, got {} pages.", svg_pages.len());

    for (i, svg_content) in svg_pages.iter().enumerate() {
        let output_path = format!("page_{}.svg", i + 1);
        fs::write(&output_path, svg_content)
            .with_context(|| format!("writing {}", output_path))?;
        log::info!("SVG for page {} saved to {}", i + 1, output_path);
    }
    Ok(())
}

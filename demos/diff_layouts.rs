// demos/diff_layouts.rs
//
// Usage: diff_layouts <base.json> <changed.json> [tolerance-px]

use std::{env, fs};

use anyhow::{bail, Context, Result};
use slidemark::{ComparerBuilder, Deck};

fn load_deck(path: &str) -> Result<Deck> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a deck", path))
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (Some(base_path), Some(changed_path)) = (args.first(), args.get(1)) else {
        bail!("usage: diff_layouts <base.json> <changed.json> [tolerance-px]");
    };
    let tolerance = match args.get(2) {
        Some(value) => value.parse::<f64>().context("tolerance must be a number")?,
        None => slidemark::diff::comparer::DEFAULT_TOLERANCE,
    };

    let comparer = ComparerBuilder::new()
        .set_base(load_deck(base_path)?)
        .set_tolerance(tolerance)
        .build()?;
    let result = comparer.compare(&load_deck(changed_path)?)?;

    println!("{}\n", result.get_readable_diff()?);
    println!("{}", result.get_outline_diff());
    if result.has_changes() {
        fs::write("deck.diff", result.get_git_diff()?)?;
        log::info!("JSON diff saved to deck.diff");
    }
    Ok(())
}

use super::error::DiffError;
use crate::diff::structured::{Change, ChangeType};
use crate::models::page::Deck;
use similar::{ChangeTag, TextDiff};
use std::{collections::BTreeMap, fmt::Write};

/// Generates a Git-style diff of the two decks' pretty-printed JSON.
pub(crate) fn generate_git_diff(
    old_deck: &Deck,
    new_deck: &Deck,
    structured_changes: &[Change],
) -> Result<String, DiffError> {
    let old_str = serde_json::to_string_pretty(old_deck)?;
    let new_str = serde_json::to_string_pretty(new_deck)?;

    let diff = TextDiff::from_lines(&old_str, &new_str);

    let mut output = String::new();
    writeln!(output, "--- a/deck.json")?;
    writeln!(output, "+++ b/deck.json")?;

    if structured_changes.is_empty() {
        // Differences below the tolerance are not worth a hunk.
        output.push_str("\nNo changes detected.\n");
        return Ok(output);
    }

    for group in diff.grouped_ops(3) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;
        let old_len = last.old_range().end - old_start;
        let new_len = last.new_range().end - new_start;
        writeln!(
            output,
            "@@ -{},{} +{},{} @@",
            old_start + 1,
            old_len,
            new_start + 1,
            new_len
        )?;

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                write!(output, "{}{}", sign, change.value())?;
                if change.missing_newline() {
                    writeln!(output)?;
                }
            }
        }
    }

    Ok(output)
}

/// Splits `pages[3].blocks[0].size` into the page index and the remaining
/// path (`blocks[0].size`).
fn parse_page_path(path: &str) -> Option<(usize, String)> {
    let rest = path.strip_prefix("pages[")?;
    let end_bracket_pos = rest.find(']')?;
    let index = rest[..end_bracket_pos].parse::<usize>().ok()?;
    let remaining = &rest[end_bracket_pos + 1..];
    Some((index, remaining.strip_prefix('.').unwrap_or(remaining).to_string()))
}

/// Names what a path inside a page points at.
fn describe_change_target(remaining_path: &str) -> String {
    let last = remaining_path
        .rsplit('.')
        .next()
        .unwrap_or(remaining_path);
    if remaining_path.is_empty() {
        return "Page".to_string();
    }
    if last.starts_with("blocks[") || last.starts_with("children[") {
        return "Block".to_string();
    }
    if remaining_path.contains(".position.") {
        return "Position".to_string();
    }
    if remaining_path.contains(".size.") || remaining_path.contains(".naturalSize.") {
        return "Size".to_string();
    }
    if remaining_path.contains(".style.") {
        return "Style".to_string();
    }
    match last {
        "text" | "html" | "tex" | "title" => "Text Content".to_string(),
        "contentHeight" => "Content Height".to_string(),
        "overflow" => "Overflow Flag".to_string(),
        "fitted" => "Fitted Flag".to_string(),
        "kind" => "Block Kind".to_string(),
        "sourceSlide" => "Source Slide".to_string(),
        _ if remaining_path.contains(".items[") => "List Item".to_string(),
        _ if remaining_path.contains(".rows[") => "Table Cell".to_string(),
        _ => "Property".to_string(),
    }
}

/// Turns `blocks[2].children[0].size.height` into
/// `block 3 > child 1 > size.height`.
fn map_path_to_friendly_name(remaining_path: &str) -> String {
    let mut parts = Vec::new();
    let mut tail = Vec::new();
    for segment in remaining_path.split('.') {
        let friendly = ["blocks", "children"].iter().find_map(|name| {
            let index = segment
                .strip_prefix(name)?
                .strip_prefix('[')?
                .strip_suffix(']')?
                .parse::<usize>()
                .ok()?;
            let label = if *name == "blocks" { "block" } else { "child" };
            Some(format!("{} {}", label, index + 1))
        });
        match friendly {
            Some(label) if tail.is_empty() => parts.push(label),
            _ => tail.push(segment),
        }
    }
    if !tail.is_empty() {
        parts.push(tail.join("."));
    }
    parts.join(" > ")
}

fn format_location(friendly_element_path: &str, is_simplify: bool) -> String {
    if friendly_element_path.is_empty() || is_simplify {
        String::new()
    } else {
        format!(" (at `{}`)", friendly_element_path)
    }
}

/// Generates a human-readable summary of `changes`, grouped by page.
pub(crate) fn generate_readable_summary(
    old_deck: &Deck,
    new_deck: &Deck,
    changes: &[Change],
    is_simplify: bool,
) -> Result<String, DiffError> {
    let mut changes_by_page: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut general_changes: Vec<String> = Vec::new();
    let mut counts = (0, 0, 0); // (add, remove, modify)

    for change in changes {
        let (page_index, remaining_path) = parse_page_path(&change.path)
            .map_or((None, change.path.clone()), |(idx, rp)| (Some(idx), rp));
        let desc = match page_index {
            Some(_) => describe_change_target(&remaining_path),
            None => change.path.split('[').next().unwrap_or("").to_string(),
        };
        let location = format_location(&map_path_to_friendly_name(&remaining_path), is_simplify);

        let line = match change.change_type {
            ChangeType::Added => {
                counts.0 += 1;
                format!("- Added {}{}", desc, location)
            }
            ChangeType::Removed => {
                counts.1 += 1;
                format!("- Removed {}{}", desc, location)
            }
            ChangeType::Modified => {
                counts.2 += 1;
                match (&change.old_value, &change.new_value) {
                    (Some(old), Some(new)) => format!(
                        "- Changed {} from {} to {}{}",
                        desc,
                        old.format_for_display(),
                        new.format_for_display(),
                        location
                    ),
                    _ => format!("- Modified {}{} (incomplete data)", desc, location),
                }
            }
        };
        log::debug!("{} -> {}", change.path, line);

        match page_index {
            Some(idx) => changes_by_page.entry(idx).or_default().push(line),
            None => general_changes.push(line),
        }
    }

    let total = counts.0 + counts.1 + counts.2;
    let mut summary = format!(
        "## Summary:\n{} pages -> {} pages. Detected {} changes: {} additions, {} removals, {} modifications.",
        old_deck.page_count(),
        new_deck.page_count(),
        total,
        counts.0,
        counts.1,
        counts.2
    );

    if total == 0 {
        summary.push_str("\n\nNo changes detected.");
        return Ok(summary);
    }

    summary.push_str("\n\n## Details:");
    if !general_changes.is_empty() {
        summary.push_str("\n\n### General Changes:\n");
        summary.push_str(&general_changes.join("\n"));
    }
    for (page_index, page_lines) in &changes_by_page {
        write!(summary, "\n\n### Page {}:\n", page_index + 1)?;
        summary.push_str(&page_lines.join("\n"));
    }
    Ok(summary)
}

use similar::{ChangeTag, TextDiff};

/// Generates a unified diff between two deck outlines, prefixed with a count
/// of added and removed lines.
///
/// # Arguments
/// * `base_text` - The outline of the base deck.
/// * `changed_text` - The outline of the compared deck.
/// * `base_filename` - Name used in the `---` header (e.g. `a/deck.md`).
/// * `changed_filename` - Name used in the `+++` header (e.g. `b/deck.md`).
pub fn generate_markdown_diff(
    base_text: &str,
    changed_text: &str,
    base_filename: &str,
    changed_filename: &str,
) -> String {
    let diff = TextDiff::from_lines(base_text, changed_text);

    let mut added_lines = 0;
    let mut removed_lines = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added_lines += 1,
            ChangeTag::Delete => removed_lines += 1,
            ChangeTag::Equal => (),
        }
    }

    let summary = format!(
        "## Summary of Changes (Text Content)\n\n- Lines Added: {}\n- Lines Removed: {}\n\n---\n\n",
        added_lines, removed_lines
    );
    let unified = diff
        .unified_diff()
        .header(base_filename, changed_filename)
        .to_string();

    summary + &unified
}

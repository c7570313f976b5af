// src/markdown/slides.rs

/// Whether a markdown line on its own separates two slides.
///
/// Recognized: `---`, runs of three or more `*` or `_`, `[slide]`,
/// `<!-- slide -->` in any case and spacing, and `<!-- NewSlide: ... -->`.
pub fn is_slide_separator(line: &str) -> bool {
    let line = line.trim();
    if line == "---" || line == "[slide]" {
        return true;
    }
    if line.len() >= 3 && (line.chars().all(|c| c == '*') || line.chars().all(|c| c == '_')) {
        return true;
    }
    let compact: String = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("<!--slide-->") || compact.contains("<!--newslide:")
}

/// Returns the fence marker (```` ``` ```` or `~~~`) a line opens or closes, if any.
pub(crate) fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

/// Splits a markdown document into the markdown of each slide.
///
/// Separators inside fenced code blocks are content. Slides that are empty
/// after splitting are dropped, so `---` at the start or end of a document
/// does not produce blank slides.
pub fn split_slides(markdown: &str) -> Vec<String> {
    if markdown.trim().is_empty() {
        return Vec::new();
    }

    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut open_fence: Option<&'static str> = None;

    for line in markdown.trim().lines() {
        if let Some(marker) = fence_marker(line) {
            open_fence = match open_fence {
                Some(open) if open == marker => None,
                None => Some(marker),
                other => other,
            };
            current.push(line);
            continue;
        }
        if open_fence.is_none() && is_slide_separator(line) {
            slides.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    slides.push(current.join("\n"));

    slides.retain(|slide| !slide.trim().is_empty());
    slides
}

/// Number of separators in the document, counted the same way as
/// [`split_slides`] finds them.
pub fn count_page_breaks(markdown: &str) -> usize {
    let mut open_fence: Option<&'static str> = None;
    let mut breaks = 0;
    for line in markdown.lines() {
        if let Some(marker) = fence_marker(line) {
            open_fence = match open_fence {
                Some(open) if open == marker => None,
                None => Some(marker),
                other => other,
            };
        } else if open_fence.is_none() && is_slide_separator(line) {
            breaks += 1;
        }
    }
    breaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_separator_syntax_splits() {
        for separator in [
            "---",
            "***",
            "*****",
            "___",
            "[slide]",
            "<!-- slide -->",
            "<!--slide-->",
            "<!-- SLIDE -->",
            "<!-- Slide -->",
            "<!-- NewSlide: Agenda -->",
            "<!--NewSlide:-->",
        ] {
            let doc = format!("# One\n{}\n# Two", separator);
            let slides = split_slides(&doc);
            assert_eq!(slides, vec!["# One", "# Two"], "separator {:?}", separator);
        }
    }

    #[test]
    fn no_separator_means_one_slide() {
        assert_eq!(split_slides("# Only\n\ntext"), vec!["# Only\n\ntext"]);
        assert!(split_slides("   \n").is_empty());
    }

    #[test]
    fn empty_slides_are_skipped() {
        let slides = split_slides("---\n# A\n---\n\n---\n# B\n---");
        assert_eq!(slides, vec!["# A", "# B"]);
        assert_eq!(count_page_breaks("---\n# A\n---\n\n---\n# B\n---"), 4);
    }

    #[test]
    fn separators_inside_code_fences_are_content() {
        let doc = "# Config\n```yaml\n---\nkey: value\n```\n---\n# Next";
        let slides = split_slides(doc);
        assert_eq!(slides.len(), 2);
        assert!(slides[0].contains("key: value"));
        assert_eq!(count_page_breaks(doc), 1);
    }

    #[test]
    fn near_misses_are_not_separators() {
        assert!(!is_slide_separator("----"));
        assert!(!is_slide_separator("**"));
        assert!(!is_slide_separator("*_*"));
        assert!(!is_slide_separator("text [slide]"));
    }
}

// src/markdown/syntax.rs
//
// Slide-specific markdown extensions, rewritten to raw HTML before the
// CommonMark parser runs.

use quick_xml::escape::{escape, partial_escape};

use super::slides::fence_marker;

const ADMONITION_VARIANTS: &[&str] = &["note", "tip", "warning", "danger", "info"];

/// Rewrites slide syntax to HTML. Fenced code blocks are left untouched.
///
/// - `==text==` to `<mark>`, `++text++` to `<u>`
/// - `![alt](src){width=50%}` and `![alt|0.5x](src)` to an `<img>` carrying
///   `data-scale-*` hints
/// - `:::columns`, `:::column [width]` and `:::<admonition> [title]` blocks
/// - `$$ ... $$` display math
pub fn preprocess(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut open_fence: Option<&'static str> = None;
    let mut directives = 0usize;
    let mut math: Option<Vec<String>> = None;

    for line in markdown.lines() {
        if let Some(lines) = math.as_mut() {
            let trimmed = line.trim();
            if let Some(last) = trimmed.strip_suffix("$$") {
                if !last.trim().is_empty() {
                    lines.push(last.trim().to_string());
                }
                let tex = lines.join("\n");
                push_math(&mut out, &tex);
                math = None;
            } else if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
            continue;
        }

        if let Some(marker) = fence_marker(line) {
            open_fence = match open_fence {
                Some(open) if open == marker => None,
                None => Some(marker),
                other => other,
            };
            out.push_str(line);
            out.push('\n');
            continue;
        }
        if open_fence.is_some() {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("$$") {
            if let Some(tex) = rest.strip_suffix("$$") {
                push_math(&mut out, tex.trim());
            } else {
                let mut lines = Vec::new();
                if !rest.trim().is_empty() {
                    lines.push(rest.trim().to_string());
                }
                math = Some(lines);
            }
            continue;
        }

        if let Some(directive) = trimmed.strip_prefix(":::") {
            let directive = directive.trim();
            if directive.is_empty() {
                if directives > 0 {
                    directives -= 1;
                    out.push_str("\n</div>\n\n");
                    continue;
                }
            } else if let Some(open) = open_directive(directive) {
                directives += 1;
                out.push('\n');
                out.push_str(&open);
                out.push_str("\n\n");
                continue;
            }
        }

        out.push_str(&rewrite_inline(line));
        out.push('\n');
    }

    if let Some(lines) = math {
        push_math(&mut out, &lines.join("\n"));
    }
    for _ in 0..directives {
        out.push_str("\n</div>\n");
    }
    out
}

fn push_math(out: &mut String, tex: &str) {
    out.push_str("\n<div class=\"math\">");
    out.push_str(&partial_escape(tex));
    out.push_str("</div>\n\n");
}

/// Opening tag for a `:::` directive, `None` for unknown directive names.
fn open_directive(directive: &str) -> Option<String> {
    let (name, arg) = match directive.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (directive, ""),
    };
    let name = name.to_ascii_lowercase();
    let arg = arg
        .strip_prefix('[')
        .and_then(|a| a.strip_suffix(']'))
        .unwrap_or(arg)
        .trim();

    match name.as_str() {
        "columns" => Some("<div class=\"columns\">".to_string()),
        "column" if arg.is_empty() => Some("<div class=\"column\">".to_string()),
        "column" => Some(format!(
            "<div class=\"column\" data-column-width=\"{}\">",
            escape(arg)
        )),
        variant if ADMONITION_VARIANTS.contains(&variant) => {
            let mut html = format!("<div class=\"admonition {}\">", variant);
            if !arg.is_empty() {
                html.push_str(&format!(
                    "\n<p class=\"admonition-title\">{}</p>",
                    partial_escape(arg)
                ));
            }
            Some(html)
        }
        _ => None,
    }
}

/// Applies the inline rewrites to one line, leaving code spans alone.
fn rewrite_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for (i, segment) in line.split('`').enumerate() {
        if i > 0 {
            out.push('`');
        }
        if i % 2 == 1 {
            out.push_str(segment);
            continue;
        }
        let segment = rewrite_scaled_images(segment);
        let segment = replace_delimited(&segment, "==", "mark");
        let segment = replace_delimited(&segment, "++", "u");
        out.push_str(&segment);
    }
    out
}

/// Wraps `delim text delim` in `<tag>`. The enclosed text must not start or
/// end with whitespace and must not consist of delimiter characters only.
fn replace_delimited(text: &str, delim: &str, tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        let Some(end) = after.find(delim) else {
            break;
        };
        let inner = &after[..end];
        let delim_char = delim.chars().next().unwrap_or_default();
        let valid = !inner.is_empty()
            && !inner.starts_with(char::is_whitespace)
            && !inner.ends_with(char::is_whitespace)
            && inner.chars().any(|c| c != delim_char);
        if valid {
            out.push_str(&rest[..start]);
            out.push_str(&format!("<{tag}>{inner}</{tag}>"));
            rest = &after[end + delim.len()..];
        } else {
            let skip = start + delim_char.len_utf8();
            out.push_str(&rest[..skip]);
            rest = &rest[skip..];
        }
    }
    out.push_str(rest);
    out
}

/// Turns `![alt](src){width=50%}` and `![alt|0.5x](src)` into an `<img>`
/// with scale hints.
///
/// Percentages become fractions (`50%` is `0.5`). Values that do not parse
/// are passed through unchanged so the layout engine can report them. When
/// both forms are present the braces win.
fn rewrite_scaled_images(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("![") {
        match parse_scaled_image(&rest[start..]) {
            Some((consumed, img)) => {
                out.push_str(&rest[..start]);
                out.push_str(&img);
                rest = &rest[start + consumed..];
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = &rest[start + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// A `data-scale-type` value with its fraction attribute.
struct ScaleHint {
    scale_type: &'static str,
    attr: &'static str,
    value: String,
}

impl ScaleHint {
    fn width(value: String) -> Self {
        ScaleHint {
            scale_type: "width",
            attr: "data-scale-x",
            value,
        }
    }

    fn height(value: String) -> Self {
        ScaleHint {
            scale_type: "height",
            attr: "data-scale-y",
            value,
        }
    }
}

fn parse_scaled_image(text: &str) -> Option<(usize, String)> {
    let alt_end = text.find("](")?;
    let src_start = alt_end + 2;
    let src_len = text[src_start..].find(')')?;
    let src = text[src_start..src_start + src_len].trim();
    let mut consumed = src_start + src_len + 1;

    let (alt, alt_hint) = split_alt_scale(&text[2..alt_end]);
    let hint = match brace_scale(&text[consumed..]) {
        Some((len, hint)) => {
            consumed += len;
            hint
        }
        None => alt_hint?,
    };
    // Markdown titles (`src "title"`) are not part of the path.
    let src = src.split_whitespace().next().unwrap_or_default();

    let img = format!(
        "<img src=\"{}\" alt=\"{}\" data-scale-type=\"{}\" {}=\"{}\" />",
        escape(src),
        escape(alt),
        hint.scale_type,
        hint.attr,
        escape(hint.value.as_str())
    );
    Some((consumed, img))
}

/// `{width=50%}` right after the image; returns the bytes consumed.
fn brace_scale(text: &str) -> Option<(usize, ScaleHint)> {
    let body = text.strip_prefix('{')?;
    let len = body.find('}')?;
    let (key, value) = body[..len].split_once('=')?;
    let value = value.trim().trim_matches('"');
    let fraction = match value.strip_suffix('%') {
        Some(pct) => pct
            .trim()
            .parse::<f64>()
            .map(|p| (p / 100.0).to_string())
            .unwrap_or_else(|_| value.to_string()),
        None => value.to_string(),
    };
    let hint = match key.trim().to_ascii_lowercase().as_str() {
        "width" => ScaleHint::width(fraction),
        "height" => ScaleHint::height(fraction),
        _ => return None,
    };
    Some((len + 2, hint))
}

/// Splits a trailing `|0.5x` (width) or `|0.5y` (height) off the alt text.
/// Only numeric suffixes count; `a|b` stays plain alt text.
fn split_alt_scale(alt: &str) -> (&str, Option<ScaleHint>) {
    let Some((name, suffix)) = alt.rsplit_once('|') else {
        return (alt, None);
    };
    let suffix = suffix.trim();
    let (value, width) = match (suffix.strip_suffix('x'), suffix.strip_suffix('y')) {
        (Some(value), _) => (value.trim(), true),
        (_, Some(value)) => (value.trim(), false),
        _ => return (alt, None),
    };
    if value.parse::<f64>().is_err() {
        return (alt, None);
    }
    let hint = if width {
        ScaleHint::width(value.to_string())
    } else {
        ScaleHint::height(value.to_string())
    };
    (name.trim_end(), Some(hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_highlight_and_underline() {
        assert_eq!(
            preprocess("a ==key== and ++under++ b"),
            "a <mark>key</mark> and <u>under</u> b\n"
        );
        assert_eq!(preprocess("C++ and C++"), "C++ and C++\n");
        assert_eq!(preprocess("`a ==b== c`"), "`a ==b== c`\n");
        assert_eq!(preprocess("Title\n====="), "Title\n=====\n");
    }

    #[test]
    fn rewrites_scaled_images() {
        assert_eq!(
            preprocess("![Chart](img/chart.png){width=50%}"),
            "<img src=\"img/chart.png\" alt=\"Chart\" data-scale-type=\"width\" data-scale-x=\"0.5\" />\n"
        );
        assert_eq!(
            preprocess("![x](a.png){height=0.4}"),
            "<img src=\"a.png\" alt=\"x\" data-scale-type=\"height\" data-scale-y=\"0.4\" />\n"
        );
        assert_eq!(
            preprocess("![x](a.png){width=huge}"),
            "<img src=\"a.png\" alt=\"x\" data-scale-type=\"width\" data-scale-x=\"huge\" />\n"
        );
        assert_eq!(preprocess("![x](a.png)"), "![x](a.png)\n");
    }

    #[test]
    fn rewrites_alt_text_scale_suffix() {
        assert_eq!(
            preprocess("![sample|0.5x](img/sample.png)"),
            "<img src=\"img/sample.png\" alt=\"sample\" data-scale-type=\"width\" data-scale-x=\"0.5\" />\n"
        );
        assert_eq!(
            preprocess("![plot | 0.3y](plot.png)"),
            "<img src=\"plot.png\" alt=\"plot\" data-scale-type=\"height\" data-scale-y=\"0.3\" />\n"
        );
        assert_eq!(
            preprocess("![a|0.5x](a.png){height=20%}"),
            "<img src=\"a.png\" alt=\"a\" data-scale-type=\"height\" data-scale-y=\"0.2\" />\n"
        );
        assert_eq!(preprocess("![either|or](a.png)"), "![either|or](a.png)\n");
        assert_eq!(preprocess("![box|max](a.png)"), "![box|max](a.png)\n");
    }

    #[test]
    fn rewrites_directives() {
        let md = ":::columns\n:::column [40%]\nLeft\n:::\n:::column\nRight\n:::\n:::";
        let html = preprocess(md);
        assert!(html.contains("<div class=\"columns\">"));
        assert!(html.contains("<div class=\"column\" data-column-width=\"40%\">"));
        assert!(html.contains("<div class=\"column\">"));
        assert_eq!(html.matches("</div>").count(), 3);
    }

    #[test]
    fn rewrites_admonitions_with_titles() {
        let html = preprocess(":::warning Mind the gap\nBody\n:::");
        assert!(html.contains("<div class=\"admonition warning\">"));
        assert!(html.contains("<p class=\"admonition-title\">Mind the gap</p>"));
        assert!(html.contains("Body"));
    }

    #[test]
    fn closes_dangling_directives() {
        let html = preprocess(":::note\nBody");
        assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
    }

    #[test]
    fn rewrites_display_math() {
        assert_eq!(
            preprocess("$$ a < b $$"),
            "\n<div class=\"math\">a &lt; b</div>\n\n"
        );
        let html = preprocess("$$\nx^2\n+ y^2\n$$\nafter");
        assert!(html.contains("<div class=\"math\">x^2\n+ y^2</div>"));
        assert!(html.ends_with("after\n"));
    }

    #[test]
    fn leaves_code_fences_alone() {
        let md = "```\n==x==\n:::note\n$$a$$\n```";
        assert_eq!(preprocess(md), format!("{}\n", md));
    }
}

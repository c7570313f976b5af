//! Layout configuration and CSS themes.
//!
//! A [`LayoutConfig`] is an explicit value passed to the engine; nothing here is
//! process-global, so documents laid out with different themes cannot interfere.
//! Configurations can be deserialized from JSON (every field has a default) or
//! derived from a theme stylesheet's `:root` custom properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{LayoutError, Result};
use crate::measure::Viewport;
use crate::models::style::parse_px;

/// Stylesheet of the built-in `default` theme.
pub const DEFAULT_THEME_CSS: &str = include_str!("../themes/default.css");

/// Theme font sizes in pixels, used when the measurer reports no computed style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSizes {
    /// `h1` through `h6`.
    pub headings: [f64; 6],
    pub body: f64,
    pub code: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        FontSizes {
            headings: [40.0, 32.0, 28.0, 24.0, 20.0, 18.0],
            body: 20.0,
            code: 16.0,
        }
    }
}

impl FontSizes {
    pub fn heading(&self, level: u8) -> f64 {
        let index = usize::from(level.clamp(1, 6)) - 1;
        self.headings[index]
    }
}

/// Page geometry and pagination knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Slide width in pixels; also the measurement viewport width.
    pub page_width: f64,
    /// Slide height in pixels; also the measurement viewport height.
    pub page_height: f64,
    /// Padding on every side of the slide.
    pub margin: f64,
    /// Vertical gap inserted between consecutive blocks on a page.
    pub block_spacing: f64,
    /// Smallest height an image may be shrunk to when fitting remaining space;
    /// below it the image moves to the next page instead.
    pub min_image_height: f64,
    /// Defer a heading to the next page rather than strand it at the bottom.
    pub keep_headings_with_content: bool,
    pub font_sizes: FontSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page_width: 960.0,
            page_height: 540.0,
            margin: 40.0,
            block_spacing: 0.0,
            min_image_height: 48.0,
            keep_headings_with_content: true,
            font_sizes: FontSizes::default(),
        }
    }
}

impl LayoutConfig {
    /// A margin-less configuration whose page budget is exactly `page_height`
    /// and whose available width is exactly `page_width`.
    pub fn with_budget(page_width: f64, page_height: f64) -> Self {
        LayoutConfig {
            page_width,
            page_height,
            margin: 0.0,
            ..LayoutConfig::default()
        }
    }

    /// Maximum vertical extent content may occupy on one page.
    pub fn page_budget(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    /// Horizontal extent available to content.
    pub fn available_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.page_width, self.page_height)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            return Err(LayoutError::Config(format!(
                "page size must be positive, got {}x{}",
                self.page_width, self.page_height
            )));
        }
        if self.margin < 0.0 || self.block_spacing < 0.0 || self.min_image_height < 0.0 {
            return Err(LayoutError::Config(
                "margin, block spacing and minimum image height must not be negative".to_string(),
            ));
        }
        if self.page_budget() <= 0.0 || self.available_width() <= 0.0 {
            return Err(LayoutError::Config(format!(
                "margin {} leaves no room on a {}x{} page",
                self.margin, self.page_width, self.page_height
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Derives the geometry from a theme's custom properties.
    ///
    /// `--slide-width`, `--slide-height` and `--slide-padding` are required;
    /// `--block-spacing`, `--min-image-height` and the `--*-font-size`
    /// variables fall back to the defaults.
    pub fn from_theme(theme: &Theme) -> Result<Self> {
        let defaults = LayoutConfig::default();
        let mut font_sizes = FontSizes::default();
        for level in 1..=6u8 {
            if let Some(px) = theme.px_value(&format!("h{}-font-size", level)) {
                font_sizes.headings[usize::from(level) - 1] = px;
            }
        }
        if let Some(px) = theme.px_value("body-font-size") {
            font_sizes.body = px;
        }
        if let Some(px) = theme.px_value("code-font-size") {
            font_sizes.code = px;
        }

        let config = LayoutConfig {
            page_width: theme.required_px("slide-width")?,
            page_height: theme.required_px("slide-height")?,
            margin: theme.required_px("slide-padding")?,
            block_spacing: theme
                .px_value("block-spacing")
                .unwrap_or(defaults.block_spacing),
            min_image_height: theme
                .px_value("min-image-height")
                .unwrap_or(defaults.min_image_height),
            keep_headings_with_content: defaults.keep_headings_with_content,
            font_sizes,
        };
        config.validate()?;
        Ok(config)
    }
}

/// A named stylesheet and its `:root` custom properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub css: String,
    variables: IndexMap<String, String>,
}

impl Theme {
    /// Parses the `:root { --name: value; }` block of a stylesheet.
    pub fn from_css(name: impl Into<String>, css: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let css = css.into();
        let variables = parse_root_variables(&css).ok_or_else(|| {
            LayoutError::Theme(format!("no :root section found in theme '{}'", name))
        })?;
        Ok(Theme {
            name,
            css,
            variables,
        })
    }

    /// The built-in `default` theme.
    pub fn builtin() -> Self {
        Theme {
            name: "default".to_string(),
            css: DEFAULT_THEME_CSS.to_string(),
            variables: parse_root_variables(DEFAULT_THEME_CSS).unwrap_or_default(),
        }
    }

    /// Loads `<dir>/<name>.css`.
    ///
    /// Theme names are restricted to ASCII alphanumerics, `-` and `_` so a name
    /// can never address a file outside `dir`.
    pub fn load(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        if !is_valid_theme_name(name) {
            return Err(LayoutError::Theme(format!("invalid theme name: {}", name)));
        }
        let dir = dir.as_ref();
        let path = dir.join(format!("{}.css", name));
        if !path.is_file() {
            let available = list_themes(dir).unwrap_or_default();
            return Err(LayoutError::Theme(format!(
                "theme '{}' not found. Available themes: {:?}",
                name, available
            )));
        }
        let css = fs::read_to_string(&path)?;
        log::debug!("Loaded theme '{}' from {}", name, path.display());
        Theme::from_css(name, css)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    /// Value of `--name` in pixels, if present and a pixel length.
    pub fn px_value(&self, name: &str) -> Option<f64> {
        self.variable(name).and_then(parse_px)
    }

    /// The stylesheet with a trailing `:root` block pinning the slide
    /// geometry to `config`, so the measured document matches the budget the
    /// paginator uses.
    pub fn css_for(&self, config: &LayoutConfig) -> String {
        format!(
            "{}\n:root {{\n    --slide-width: {}px;\n    --slide-height: {}px;\n    --slide-padding: {}px;\n}}\n",
            self.css.trim_end(),
            config.page_width,
            config.page_height,
            config.margin
        )
    }

    fn required_px(&self, name: &str) -> Result<f64> {
        let raw = self.variable(name).ok_or_else(|| {
            LayoutError::Theme(format!(
                "theme '{}' is missing required variable --{}",
                self.name, name
            ))
        })?;
        parse_px(raw).ok_or_else(|| {
            LayoutError::Theme(format!(
                "theme '{}' variable --{} is not a pixel value: {}",
                self.name, name, raw
            ))
        })
    }
}

/// Names of the `.css` files in `dir`, sorted.
pub fn list_themes(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "css") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn is_valid_theme_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_root_variables(css: &str) -> Option<IndexMap<String, String>> {
    let start = css.find(":root")?;
    let rest = &css[start..];
    let open = rest.find('{')?;
    let close = rest[open..].find('}')? + open;
    let body = &rest[open + 1..close];

    let mut variables = IndexMap::new();
    for decl in body.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        if let Some(name) = name.trim().strip_prefix("--") {
            variables.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    Some(variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSS: &str = r#"
        :root {
            --slide-width: 1280px;
            --slide-height: 720px;
            --slide-padding: 48px;
            --block-spacing: 12px;
            --h1-font-size: 56px;
            --slide-font-family: 'Inter';
        }
        .slide { padding: var(--slide-padding); }
    "#;

    #[test]
    fn derives_geometry_from_theme_variables() {
        let theme = Theme::from_css("wide", CSS).unwrap();
        let config = LayoutConfig::from_theme(&theme).unwrap();
        assert_eq!(config.page_width, 1280.0);
        assert_eq!(config.page_height, 720.0);
        assert_eq!(config.page_budget(), 720.0 - 96.0);
        assert_eq!(config.available_width(), 1280.0 - 96.0);
        assert_eq!(config.block_spacing, 12.0);
        assert_eq!(config.font_sizes.heading(1), 56.0);
        assert_eq!(config.font_sizes.heading(2), FontSizes::default().heading(2));
        assert_eq!(theme.variable("slide-font-family"), Some("'Inter'"));
    }

    #[test]
    fn missing_slide_dimensions_is_a_theme_error() {
        let theme = Theme::from_css("broken", ":root { --slide-width: 960px; }").unwrap();
        let err = LayoutConfig::from_theme(&theme).unwrap_err();
        assert!(matches!(err, LayoutError::Theme(msg) if msg.contains("slide-height")));
    }

    #[test]
    fn builtin_theme_is_usable() {
        let config = LayoutConfig::from_theme(&Theme::builtin()).unwrap();
        assert_eq!(config.page_width, 960.0);
        assert_eq!(config.page_height, 540.0);
    }

    #[test]
    fn json_config_fills_defaults() {
        let config = LayoutConfig::from_json_str(r#"{"pageHeight": 600, "margin": 50}"#).unwrap();
        assert_eq!(config.page_budget(), 500.0);
        assert_eq!(config.page_width, 960.0);
        assert!(config.keep_headings_with_content);

        let err = LayoutConfig::from_json_str(r#"{"pageHeight": 60, "margin": 40}"#).unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }

    #[test]
    fn loads_themes_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("dark.css")).unwrap();
        file.write_all(CSS.as_bytes()).unwrap();

        let theme = Theme::load(dir.path(), "dark").unwrap();
        assert_eq!(theme.px_value("slide-padding"), Some(48.0));
        assert_eq!(list_themes(dir.path()).unwrap(), vec!["dark".to_string()]);

        assert!(matches!(
            Theme::load(dir.path(), "../etc/passwd"),
            Err(LayoutError::Theme(_))
        ));
        let err = Theme::load(dir.path(), "light").unwrap_err();
        assert!(matches!(err, LayoutError::Theme(msg) if msg.contains("dark")));
    }
}

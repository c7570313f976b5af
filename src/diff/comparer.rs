use crate::converters::markdown::extract_text_from_deck;
use crate::diff::formatting::{generate_git_diff, generate_readable_summary};
use crate::diff::markdown::generate_markdown_diff;
use crate::diff::structured::{Change, ChangeCollector};
use crate::models::page::Deck;
use serde_json::Value as JsonValue;
use treediff::diff;

use super::error::DiffError;

/// Numeric changes smaller than this many pixels are ignored by default.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

/// Builder for creating a `Comparer`.
pub struct ComparerBuilder {
    base: Option<Deck>,
    is_simplify: bool,
    tolerance: f64,
}

impl Default for ComparerBuilder {
    fn default() -> Self {
        ComparerBuilder {
            base: None,
            is_simplify: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ComparerBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the base deck to compare against.
    pub fn set_base(mut self, base: Deck) -> Self {
        self.base = Some(base);
        self
    }

    /// Leaves block locations out of the readable summary.
    pub fn set_simplify(mut self, is_simplify: bool) -> Self {
        self.is_simplify = is_simplify;
        self
    }

    /// Numeric changes below `tolerance` pixels are not reported.
    pub fn set_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn build(self) -> Result<Comparer, DiffError> {
        let base = self.base.ok_or(DiffError::MissingBase)?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(DiffError::InvalidTolerance(self.tolerance));
        }
        Ok(Comparer {
            base,
            is_simplify: self.is_simplify,
            tolerance: self.tolerance,
        })
    }
}

/// Compares decks against a stored base.
pub struct Comparer {
    base: Deck,
    is_simplify: bool,
    tolerance: f64,
}

impl Comparer {
    /// Compares the stored base deck against `other`.
    pub fn compare(&self, other: &Deck) -> Result<ComparisonResult, DiffError> {
        let base_val: JsonValue = serde_json::to_value(&self.base)?;
        let other_val: JsonValue = serde_json::to_value(other)?;

        let mut collector = ChangeCollector::new(self.tolerance);
        diff(&base_val, &other_val, &mut collector);
        log::debug!(
            "Compared decks: {} changes above {}px",
            collector.changes.len(),
            self.tolerance
        );

        Ok(ComparisonResult {
            base: self.base.clone(),
            compared: other.clone(),
            changes: collector.changes,
            is_simplify: self.is_simplify,
        })
    }
}

/// Holds the results of a comparison between two decks.
pub struct ComparisonResult {
    base: Deck,
    compared: Deck,
    changes: Vec<Change>,
    is_simplify: bool,
}

impl ComparisonResult {
    /// Returns the structured list of changes found.
    pub fn get_structured_diff(&self) -> &[Change] {
        &self.changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Generates a Git-style diff of the decks' JSON.
    pub fn get_git_diff(&self) -> Result<String, DiffError> {
        generate_git_diff(&self.base, &self.compared, &self.changes)
    }

    /// Generates a unified diff of the decks' text outlines.
    pub fn get_outline_diff(&self) -> String {
        generate_markdown_diff(
            &extract_text_from_deck(&self.base),
            &extract_text_from_deck(&self.compared),
            "a/deck.md",
            "b/deck.md",
        )
    }

    /// Generates a human-readable summary of the differences.
    pub fn get_readable_diff(&self) -> Result<String, DiffError> {
        generate_readable_summary(&self.base, &self.compared, &self.changes, self.is_simplify)
    }
}

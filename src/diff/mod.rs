//! Compares two laid-out decks.
//!
//! Changes are collected structurally over the decks' JSON with `treediff`,
//! ignoring pixel jitter below a tolerance, and can be rendered as a unified
//! JSON diff, an outline diff or a readable per-page summary.

pub mod comparer;
pub mod error;
mod formatting;
pub mod markdown;
pub mod structured;

pub use comparer::{Comparer, ComparerBuilder, ComparisonResult};
pub use error::DiffError;
pub use structured::{Change, ChangeType, ValueRepr};

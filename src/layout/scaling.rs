//! Image and table scaling against the page.
//!
//! Scale-to-request always runs first; shrinking to the remaining space is the
//! fallback when the requested size does not fit.

use crate::config::LayoutConfig;
use crate::models::common::Size;
use crate::models::image::{ScaleAxis, ScaleRequest};

/// Tolerance for comparing accumulated pixel heights.
pub(crate) const EPSILON: f64 = 1e-6;

/// What to do with a scalable block given the space left on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    /// The size fits as is.
    Fits(Size),
    /// Shrunk so its height equals the remaining space.
    Fitted(Size),
    /// Would have to shrink below the minimum image height.
    Defer,
}

/// Size that satisfies `request` against the page's usable area, preserving
/// the natural aspect ratio. Degenerate natural sizes are returned unchanged.
pub fn requested_size(natural: Size, request: ScaleRequest, config: &LayoutConfig) -> Size {
    requested_size_within(natural, request, config.available_width(), config.page_budget())
}

/// Like [`requested_size`], against an explicit `width` x `height` area.
pub fn requested_size_within(natural: Size, request: ScaleRequest, width: f64, height: f64) -> Size {
    let (target, current) = match request.axis {
        ScaleAxis::Width => (request.fraction * width, natural.width),
        ScaleAxis::Height => (request.fraction * height, natural.height),
    };
    if current <= 0.0 {
        return natural;
    }
    natural.scaled(target / current)
}

/// Checks `size` against `remaining` vertical space.
pub fn fit_to_remaining(size: Size, remaining: f64, min_height: f64) -> FitOutcome {
    if size.height <= remaining + EPSILON {
        return FitOutcome::Fits(size);
    }
    if remaining + EPSILON < min_height || remaining <= 0.0 || size.height <= 0.0 {
        return FitOutcome::Defer;
    }
    FitOutcome::Fitted(size.scaled(remaining / size.height))
}

/// Smallest height a scalable block can take on a page without being
/// deferred.
pub fn min_fit_height(size: Size, min_height: f64) -> f64 {
    size.height.min(min_height)
}

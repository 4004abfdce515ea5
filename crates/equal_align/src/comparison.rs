//! Pairwise adjacency test and height correction.
//!
//! Two boxes are compared at a time. If their vertical spans overlap and
//! their bottom edges differ, the box whose bottom is higher gets an inline
//! `min-height` that brings its bottom level with the other one. The taller
//! box is never touched.

use log::{trace, warn};

use crate::capabilities::EngineProfile;
use crate::css_value::format_px;
use crate::geometry::{Span, TrackedElement};
use crate::host::{GeometryHost, NodeHandle, StyleHost};

/// Whether two spans intersect vertically. Touching edges do not count.
pub fn is_adjacent(first: Span, second: Span) -> bool {
    let overlap = first.bottom().min(second.bottom()) - first.top.max(second.top);
    overlap > 0.0
}

/// Absolute distance between the two bottom edges.
pub fn bottom_difference(first: Span, second: Span) -> f64 {
    (second.bottom() - first.bottom()).abs()
}

/// Full box height of the larger element, counting the cushion a second time
/// for border-box elements so both modes compare on the same footing.
pub fn larger_extent<N: NodeHandle>(first: &TrackedElement<N>, second: &TrackedElement<N>) -> f64 {
    let extent = |element: &TrackedElement<N>| {
        element.outer_height() + if element.is_border_box() { element.cushion() } else { 0.0 }
    };
    extent(first).max(extent(second))
}

/// Inline `min-height` that grows `shorter` by `difference`.
pub fn required_min_height<N: NodeHandle>(
    shorter: &TrackedElement<N>,
    difference: f64,
    profile: EngineProfile,
) -> f64 {
    let subtract = if profile.has_legacy_min_height_quirk() || !shorter.is_border_box() {
        shorter.cushion()
    } else {
        0.0
    };
    shorter.outer_height() + difference - subtract
}

/// Which element of a compared pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Result of comparing one pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Geometry could not be read for one of the elements.
    Unreadable,
    /// Vertical spans do not overlap.
    NotAdjacent,
    /// Bottom edges already line up.
    Level,
    /// The difference is not below `larger * threshold`.
    BelowThreshold { difference: f64, larger: f64 },
    /// The shorter element received a new `min-height`.
    Adjusted { side: Side, min_height: f64 },
}

impl Outcome {
    pub fn is_adjacent(self) -> bool {
        !matches!(self, Self::Unreadable | Self::NotAdjacent)
    }

    pub fn is_adjusted(self) -> bool {
        matches!(self, Self::Adjusted { .. })
    }
}

/// Evaluates pairs with a fixed threshold and engine profile.
#[derive(Copy, Clone, Debug)]
pub struct ComparisonEngine {
    threshold: f64,
    profile: EngineProfile,
}

impl ComparisonEngine {
    pub const fn new(threshold: f64, profile: EngineProfile) -> Self {
        Self { threshold, profile }
    }

    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    pub const fn profile(&self) -> EngineProfile {
        self.profile
    }

    /// Decide what to do with a pair whose geometry is already current.
    /// Pure: neither element is mutated.
    #[allow(
        clippy::neg_cmp_op_on_partial_ord,
        reason = "NaN differences must land in the skip branches"
    )]
    pub fn evaluate<N: NodeHandle>(&self, first: &TrackedElement<N>, second: &TrackedElement<N>) -> Outcome {
        if !is_adjacent(first.span(), second.span()) {
            return Outcome::NotAdjacent;
        }

        let difference = bottom_difference(first.span(), second.span());
        // NaN geometry falls through here as well.
        if !(difference > 0.0) {
            return Outcome::Level;
        }

        let larger = larger_extent(first, second);
        if !(difference < larger * self.threshold) {
            return Outcome::BelowThreshold { difference, larger };
        }

        let (side, shorter) = if first.span().bottom() < second.span().bottom() {
            (Side::First, first)
        } else {
            (Side::Second, second)
        };
        Outcome::Adjusted {
            side,
            min_height: required_min_height(shorter, difference, self.profile),
        }
    }

    /// Refresh both elements' geometry, evaluate the pair and apply the
    /// resulting `min-height` to the shorter element.
    pub fn compare<H, N>(
        &self,
        host: &mut H,
        first: &mut TrackedElement<N>,
        second: &mut TrackedElement<N>,
    ) -> Outcome
    where
        N: NodeHandle,
        H: StyleHost<Node = N> + GeometryHost<Node = N> + ?Sized,
    {
        for element in [&mut *first, &mut *second] {
            if let Err(err) = element.refresh(&*host) {
                warn!("equal_align: skipping pair, {:?} unreadable: {err}", element.node());
                return Outcome::Unreadable;
            }
        }

        let outcome = self.evaluate(first, second);
        trace!(
            "equal_align: {:?} {:?} vs {:?} {:?} -> {outcome:?}",
            first.node(),
            first.span(),
            second.node(),
            second.span()
        );

        if let Outcome::Adjusted { side, min_height } = outcome {
            let target = match side {
                Side::First => &*first,
                Side::Second => &*second,
            };
            target.apply_min_height(host, &format_px(min_height));
        }
        outcome
    }
}

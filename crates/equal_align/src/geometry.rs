//! Per-element geometry snapshots.
//!
//! A [`TrackedElement`] pairs a host node with the box-model metrics resolved
//! when it was first tracked and the most recent geometry reading. Box-model
//! metrics are assumed stable; `top` and `outer_height` are not and must be
//! re-read before every comparison because earlier adjustments in the same
//! pass move them.

use anyhow::Result;
use log::{debug, warn};

use crate::capabilities::PropertyLookup;
use crate::css_value::parse_px;
use crate::host::{GeometryHost, NodeHandle, StyleHost};

/// Resolved `box-sizing` mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    /// Parse a computed `box-sizing` value. Anything other than `border-box`
    /// (including an unresolved empty value) is treated as `content-box`.
    pub fn from_css(value: &str) -> Self {
        if value.trim() == "border-box" {
            Self::BorderBox
        } else {
            Self::ContentBox
        }
    }
}

/// Vertical padding and border widths plus sizing mode, in CSS pixels.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct BoxMetrics {
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub border_top_width: f64,
    pub border_bottom_width: f64,
    pub box_sizing: BoxSizing,
}

impl BoxMetrics {
    /// Sum of vertical padding and border widths.
    pub fn cushion(&self) -> f64 {
        self.padding_top + self.padding_bottom + self.border_top_width + self.border_bottom_width
    }

    /// Resolve the vertical box model of `node` from computed style.
    ///
    /// Properties missing under every prefix resolve to 0. A border whose
    /// style is `none` contributes 0 regardless of its reported width.
    pub fn resolve<H: StyleHost + ?Sized>(host: &H, node: H::Node, lookup: PropertyLookup) -> Self {
        let length = |property: &str| -> f64 {
            let raw = lookup.resolve(host, node, property);
            parse_px(&raw).unwrap_or_else(|| {
                debug!("equal_align: {property}={raw:?} on {node:?} is not a pixel length, using 0");
                0.0
            })
        };
        let border = |side: &str| -> f64 {
            if lookup.resolve(host, node, &format!("border-{side}-style")) == "none" {
                0.0
            } else {
                length(&format!("border-{side}-width"))
            }
        };

        Self {
            padding_top: length("padding-top"),
            padding_bottom: length("padding-bottom"),
            border_top_width: border("top"),
            border_bottom_width: border("bottom"),
            box_sizing: BoxSizing::from_css(&lookup.resolve(host, node, "box-sizing")),
        }
    }
}

/// Vertical extent of a box: `[top, top + height)`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Offset of the bottom edge.
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }
}

/// One element under management.
#[derive(Clone, Debug)]
pub struct TrackedElement<N> {
    node: N,
    original_min_height: String,
    metrics: BoxMetrics,
    span: Span,
}

impl<N: NodeHandle> TrackedElement<N> {
    /// Capture the element's original inline `min-height`, its box model and
    /// an initial geometry reading.
    pub fn capture<H>(host: &H, node: N, lookup: PropertyLookup) -> Self
    where
        H: StyleHost<Node = N> + GeometryHost<Node = N> + ?Sized,
    {
        let mut element = Self {
            node,
            original_min_height: host.inline_min_height(node),
            metrics: BoxMetrics::resolve(host, node, lookup),
            span: Span::default(),
        };
        if let Err(err) = element.refresh(host) {
            warn!("equal_align: initial geometry of {node:?} unreadable: {err}");
        }
        element
    }

    /// Build an element from already-known values.
    pub fn from_parts(node: N, original_min_height: String, metrics: BoxMetrics, span: Span) -> Self {
        Self {
            node,
            original_min_height,
            metrics,
            span,
        }
    }

    pub fn node(&self) -> N {
        self.node
    }

    /// Inline `min-height` present before the aligner touched the element.
    pub fn original_min_height(&self) -> &str {
        &self.original_min_height
    }

    pub fn metrics(&self) -> &BoxMetrics {
        &self.metrics
    }

    /// Last geometry reading.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn top(&self) -> f64 {
        self.span.top
    }

    pub fn outer_height(&self) -> f64 {
        self.span.height
    }

    pub fn cushion(&self) -> f64 {
        self.metrics.cushion()
    }

    pub fn is_border_box(&self) -> bool {
        self.metrics.box_sizing == BoxSizing::BorderBox
    }

    /// Re-read the offset top from the host.
    ///
    /// # Errors
    ///
    /// Returns the host error if the node cannot be measured.
    pub fn refresh_top<H: GeometryHost<Node = N> + ?Sized>(&mut self, host: &H) -> Result<()> {
        self.span.top = host.offset_top(self.node)?;
        Ok(())
    }

    /// Re-read the fractional border-box height from the host.
    ///
    /// # Errors
    ///
    /// Returns the host error if the node cannot be measured.
    pub fn refresh_outer_height<H: GeometryHost<Node = N> + ?Sized>(&mut self, host: &H) -> Result<()> {
        self.span.height = host.bounding_height(self.node)?;
        Ok(())
    }

    /// Re-read both top and height.
    ///
    /// # Errors
    ///
    /// Returns the first host error encountered.
    pub fn refresh<H: GeometryHost<Node = N> + ?Sized>(&mut self, host: &H) -> Result<()> {
        self.refresh_top(host)?;
        self.refresh_outer_height(host)
    }

    /// Write an inline `min-height`; an empty value clears the override.
    pub fn apply_min_height<H: StyleHost<Node = N> + ?Sized>(&self, host: &mut H, value: &str) {
        if let Err(err) = host.set_inline_min_height(self.node, value) {
            warn!("equal_align: failed to set min-height on {:?}: {err}", self.node);
        }
    }

    /// Put back the inline `min-height` captured at construction.
    pub fn restore<H: StyleHost<Node = N> + ?Sized>(&self, host: &mut H) {
        self.apply_min_height(host, &self.original_min_height);
    }
}

//! Equal-height alignment for boxes that share a row.
//!
//! Given a container and one or more class names, the aligner tracks the
//! matching descendants and, whenever layout may have changed (first run,
//! window resize, an image inside a tracked box finishing loading), compares
//! every pair of tracked boxes. Pairs whose vertical spans overlap are
//! considered part of the same row; the box whose bottom edge is higher gets
//! an inline `min-height` so both bottoms line up.
//!
//! The crate does not talk to a browser directly. It is driven through the
//! traits in [`host`], which a page binding implements.
//!
//! # Architecture
//!
//! ```text
//! host event (resize / load)
//!     ↓
//! EqualAlign::handle_event   → clear overrides
//!     ↓
//! ComparisonEngine::compare  (every pair i < j, ascending)
//!     ↓
//! TrackedElement::apply_min_height on the shorter box
//! ```

pub mod capabilities;
pub mod comparison;
pub mod config;
pub mod css_value;
pub mod events;
pub mod geometry;
pub mod host;
pub mod orchestrator;
pub mod selection;

pub use capabilities::{EngineProfile, MinHeightModel, PropertyLookup, VENDOR_PREFIXES};
pub use comparison::{ComparisonEngine, Outcome, Side, is_adjacent};
pub use config::{AlignConfig, RunHooks, TargetClass};
pub use events::{PassTrigger, Subscription, Subscriptions};
pub use geometry::{BoxMetrics, BoxSizing, Span, TrackedElement};
pub use host::{
    EventHost, EventKind, EventTarget, GeometryHost, Host, HostEvent, ListenerId, NodeHandle,
    ProbeHost, SelectionHost, StyleHost,
};
pub use orchestrator::{EqualAlign, Lifecycle, PassReport};

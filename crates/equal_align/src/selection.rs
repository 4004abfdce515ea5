//! Building the managed set from class filters.

use log::debug;

use crate::capabilities::PropertyLookup;
use crate::config::TargetClass;
use crate::geometry::TrackedElement;
use crate::host::{GeometryHost, NodeHandle, StyleHost};

/// Track every descendant of `container` matching `target`.
///
/// Filters are applied in order and their matches concatenated in document
/// order. An element matching several filters is tracked once per filter. A
/// missing container yields an empty set.
pub fn select<H, N>(
    host: &H,
    container: Option<N>,
    target: &TargetClass,
    lookup: PropertyLookup,
) -> Vec<TrackedElement<N>>
where
    N: NodeHandle,
    H: StyleHost<Node = N> + GeometryHost<Node = N> + ?Sized,
{
    let Some(root) = container else {
        debug!("equal_align: no container, nothing to track");
        return Vec::new();
    };

    let mut tracked = Vec::new();
    for class in target.names() {
        let matches = host.query_class(root, class);
        debug!("equal_align: .{class} matched {} element(s) under {root:?}", matches.len());
        tracked.extend(
            matches
                .into_iter()
                .map(|node| TrackedElement::capture(host, node, lookup)),
        );
    }
    tracked
}

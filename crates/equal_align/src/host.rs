//! Collaborator interfaces the aligner is driven through.
//!
//! The aligner never owns the document. It reads geometry and computed style,
//! writes a single inline property (`min-height`), inserts one throwaway probe
//! element at startup, and registers a handful of event listeners. Each of
//! those concerns is a small trait so hosts (a real browser binding, the
//! headless page used in tests) only implement what the aligner touches.

use core::fmt::Debug;
use core::hash::Hash;

use anyhow::Result;

/// Handle to a node owned by the host. Cheap to copy and compare.
pub trait NodeHandle: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> NodeHandle for T {}

/// Something an event listener can be attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget<N> {
    /// The top-level viewport.
    Window,
    /// A node in the document.
    Node(N),
}

/// The event kinds the aligner reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Viewport size changed.
    Resize,
    /// A resource (an image) finished loading.
    Load,
}

impl EventKind {
    /// DOM event type name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Load => "load",
        }
    }
}

/// An event delivered by the host to the aligner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostEvent<N> {
    pub target: EventTarget<N>,
    pub kind: EventKind,
}

/// Opaque id the host hands out for each registered listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Subtree queries.
pub trait SelectionHost {
    type Node: NodeHandle;

    /// Descendants of `root` whose class list contains `class`, in document order.
    fn query_class(&self, root: Self::Node, class: &str) -> Vec<Self::Node>;

    /// `<img>` descendants of `node`, in document order.
    fn descendant_images(&self, node: Self::Node) -> Vec<Self::Node>;
}

/// Computed and inline style access.
pub trait StyleHost: SelectionHost {
    /// Computed value for one exact property name. `None` or an empty string
    /// both mean "not reported".
    fn computed_value(&self, node: Self::Node, property: &str) -> Option<String>;

    /// Current inline `min-height` declaration (empty when unset).
    fn inline_min_height(&self, node: Self::Node) -> String;

    /// Replace the inline `min-height` declaration. An empty value clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node no longer exists.
    fn set_inline_min_height(&mut self, node: Self::Node, value: &str) -> Result<()>;
}

/// Layout geometry queries. All values are CSS pixels.
pub trait GeometryHost: SelectionHost {
    /// Offset of the node's top edge relative to its offset parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is detached or unknown.
    fn offset_top(&self, node: Self::Node) -> Result<f64>;

    /// Border-box height from the bounding client rect (fractional).
    ///
    /// # Errors
    ///
    /// Returns an error if the node is detached or unknown.
    fn bounding_height(&self, node: Self::Node) -> Result<f64>;

    /// Border-box height rounded the way `offsetHeight` reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is detached or unknown.
    fn offset_height(&self, node: Self::Node) -> Result<f64>;
}

/// Lets the aligner measure engine behaviour with a throwaway element.
pub trait ProbeHost: SelectionHost {
    /// Insert an element styled with `declarations` into an offscreen,
    /// zero-sized, absolutely positioned wrapper under the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no body to attach to.
    fn insert_offscreen_probe(&mut self, declarations: &[(&str, &str)]) -> Result<Self::Node>;

    /// Remove the probe and its wrapper.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe was already removed.
    fn remove_probe(&mut self, probe: Self::Node) -> Result<()>;
}

/// Listener registration.
pub trait EventHost: SelectionHost {
    /// # Errors
    ///
    /// Returns an error if the target cannot receive listeners.
    fn add_listener(&mut self, target: EventTarget<Self::Node>, kind: EventKind)
    -> Result<ListenerId>;

    /// # Errors
    ///
    /// Returns an error if the listener is not registered.
    fn remove_listener(&mut self, id: ListenerId) -> Result<()>;
}

/// Everything the aligner needs from its host.
pub trait Host: StyleHost + GeometryHost + ProbeHost + EventHost {}

impl<T: StyleHost + GeometryHost + ProbeHost + EventHost> Host for T {}

//! A headless document for driving `equal_align` without a browser.
//!
//! [`Page`] keeps a DOM mirror fed by [`DOMUpdate`]s, resolves a small slice
//! of CSS (lengths, padding, borders, `box-sizing`, `min-height`,
//! positioning), lays boxes out in wrapping rows and records event
//! listeners. It implements every `equal_align` host trait with
//! [`NodeKey`] as the node handle.
//!
//! Events are not dispatched to callbacks. Operations that would fire one
//! ([`Page::resize_viewport`], [`Page::load_image`]) return the
//! [`equal_align::HostEvent`] when a listener is registered for it, and the
//! caller hands it to the aligner.
//!
//! [`EngineMode::Legacy`] imitates an older engine: styles are read through
//! a camel-cased `currentStyle` table that only knows `box-sizing` under its
//! `-ms-` name, and `min-height` is always applied as a content-box length.

pub mod builder;
pub mod dom;
pub mod layout;
pub mod page;
pub mod scene;
pub mod style;

pub use builder::{DEFAULT_VIEWPORT_WIDTH, PageBuilder};
pub use dom::{DOMSubscriber, DOMUpdate, NodeKey};
pub use layout::LayoutRect;
pub use page::{EngineMode, Listener, NodeKind, Page, PageNode};
pub use scene::{LoadedScene, Scene, SceneMode, SceneNode};

//! Programmatic document construction.

use anyhow::Result;

use crate::dom::{DOMSubscriber, DOMUpdate, NodeKey};
use crate::page::{EngineMode, Page};

/// Viewport width used when none is given.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;

/// Records a stream of [`DOMUpdate`]s and replays it into a fresh [`Page`].
///
/// The builder always starts with `<html>` ([`NodeKey::HTML`]) and
/// `<body>` ([`NodeKey::BODY`]); every element added afterwards is appended
/// to its parent and gets the next free key.
#[derive(Debug, Clone)]
pub struct PageBuilder {
    mode: EngineMode,
    viewport_width: f64,
    updates: Vec<DOMUpdate>,
    next_key: u64,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new(EngineMode::Standard)
    }
}

impl PageBuilder {
    pub fn new(mode: EngineMode) -> Self {
        let updates = vec![
            DOMUpdate::InsertElement {
                parent: NodeKey::ROOT,
                node: NodeKey::HTML,
                tag: "html".to_owned(),
                pos: 0,
            },
            DOMUpdate::InsertElement {
                parent: NodeKey::HTML,
                node: NodeKey::BODY,
                tag: "body".to_owned(),
                pos: 0,
            },
        ];
        Self {
            mode,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            updates,
            next_key: NodeKey::BODY.0 + 1,
        }
    }

    #[must_use]
    pub fn viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    /// Append an element and return its key.
    pub fn element(&mut self, parent: NodeKey, tag: &str) -> NodeKey {
        let node = NodeKey(self.next_key);
        self.next_key += 1;
        self.updates.push(DOMUpdate::InsertElement {
            parent,
            node,
            tag: tag.to_owned(),
            pos: usize::MAX,
        });
        node
    }

    /// Set an attribute on an element added earlier.
    pub fn attr(&mut self, node: NodeKey, name: &str, value: &str) -> &mut Self {
        self.updates.push(DOMUpdate::SetAttr {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
        self
    }

    /// Append a `<div>` with the given class list and inline style. Empty
    /// strings leave the attribute unset.
    pub fn div(&mut self, parent: NodeKey, class: &str, style: &str) -> NodeKey {
        let node = self.element(parent, "div");
        self.class_and_style(node, class, style);
        node
    }

    /// Append an `<img>` that has not loaded yet; it renders with zero
    /// content height until [`Page::load_image`] is called.
    pub fn img(&mut self, parent: NodeKey, style: &str) -> NodeKey {
        let node = self.element(parent, "img");
        self.class_and_style(node, "", style);
        node
    }

    fn class_and_style(&mut self, node: NodeKey, class: &str, style: &str) {
        if !class.is_empty() {
            self.attr(node, "class", class);
        }
        if !style.is_empty() {
            self.attr(node, "style", style);
        }
    }

    /// Updates recorded so far, in order.
    pub fn updates(&self) -> &[DOMUpdate] {
        &self.updates
    }

    /// Replay the recorded updates, finish the document and lay it out.
    ///
    /// # Errors
    ///
    /// Returns an error if an update refers to a node that was never added.
    pub fn build(self) -> Result<Page> {
        let mut page = Page::new(self.mode, self.viewport_width);
        page.apply_batch(self.updates)?;
        page.apply_update(DOMUpdate::EndOfDocument)?;
        Ok(page)
    }
}

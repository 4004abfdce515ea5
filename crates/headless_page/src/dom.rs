//! Stable node keys and the DOM update model the page mirrors.

use anyhow::Result;

/// A 64-bit stable key for DOM nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node (always present).
    pub const ROOT: Self = Self(0);
    /// The `<html>` element created by [`crate::PageBuilder`].
    pub const HTML: Self = Self(1);
    /// The `<body>` element created by [`crate::PageBuilder`].
    pub const BODY: Self = Self(2);
}

/// A batchable update applied to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    /// Set (or clear, with an empty value) one inline style declaration.
    SetStyle {
        node: NodeKey,
        property: String,
        value: String,
    },
    RemoveNode {
        node: NodeKey,
    },
    EndOfDocument,
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update references unknown nodes.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()>;

    /// Apply a batch in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`DOMSubscriber::apply_update`].
    fn apply_batch(&mut self, batch: Vec<DOMUpdate>) -> Result<()> {
        for update in batch {
            self.apply_update(update)?;
        }
        Ok(())
    }
}

//! JSON scene descriptions for fixtures.
//!
//! ```json
//! {
//!   "mode": "legacy",
//!   "viewportWidth": 600,
//!   "nodes": [
//!     { "id": "list", "class": "list", "children": [
//!       { "id": "a", "class": "item", "style": "width: 300px; height: 120px" }
//!     ]}
//!   ]
//! }
//! ```
//!
//! Top-level nodes are appended to `<body>`. `id` is only a handle for
//! looking nodes up after the build; it is not written to the document.

use anyhow::{Context as _, Result, bail};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::builder::{DEFAULT_VIEWPORT_WIDTH, PageBuilder};
use crate::dom::NodeKey;
use crate::page::{EngineMode, Page};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneMode {
    #[default]
    Standard,
    Legacy,
}

impl From<SceneMode> for EngineMode {
    fn from(mode: SceneMode) -> Self {
        match mode {
            SceneMode::Standard => Self::Standard,
            SceneMode::Legacy => Self::Legacy,
        }
    }
}

fn default_tag() -> String {
    "div".to_owned()
}

fn default_viewport_width() -> f64 {
    DEFAULT_VIEWPORT_WIDTH
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SceneNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub mode: SceneMode,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

/// A built scene: the page plus the keys of every node that had an `id`.
#[derive(Debug)]
pub struct LoadedScene {
    pub page: Page,
    ids: FxHashMap<String, NodeKey>,
}

impl LoadedScene {
    pub fn key(&self, id: &str) -> Option<NodeKey> {
        self.ids.get(id).copied()
    }

    /// Like [`LoadedScene::key`] but an unknown id is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if no node in the scene declared `id`.
    pub fn require(&self, id: &str) -> Result<NodeKey> {
        self.key(id)
            .with_context(|| format!("scene has no node with id {id:?}"))
    }
}

impl Scene {
    /// # Errors
    ///
    /// Returns an error if `source` is not a valid scene document.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("invalid scene description")
    }

    /// Build the described document.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids or if the page rejects an update.
    pub fn build(&self) -> Result<LoadedScene> {
        let mut builder = PageBuilder::new(self.mode.into()).viewport_width(self.viewport_width);
        let mut ids = FxHashMap::default();
        for node in &self.nodes {
            add_node(&mut builder, &mut ids, NodeKey::BODY, node)?;
        }
        Ok(LoadedScene {
            page: builder.build()?,
            ids,
        })
    }
}

fn add_node(
    builder: &mut PageBuilder,
    ids: &mut FxHashMap<String, NodeKey>,
    parent: NodeKey,
    node: &SceneNode,
) -> Result<()> {
    let key = builder.element(parent, &node.tag);
    if !node.class.is_empty() {
        builder.attr(key, "class", &node.class);
    }
    if !node.style.is_empty() {
        builder.attr(key, "style", &node.style);
    }
    if let Some(id) = &node.id
        && ids.insert(id.clone(), key).is_some()
    {
        bail!("duplicate scene id {id:?}");
    }
    for child in &node.children {
        add_node(builder, ids, key, child)?;
    }
    Ok(())
}

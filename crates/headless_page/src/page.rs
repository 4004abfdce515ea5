//! The in-memory page: DOM mirror, style, layout and listener registry.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};
use equal_align::{
    EventHost, EventKind, EventTarget, GeometryHost, HostEvent, ListenerId, ProbeHost, SelectionHost,
    StyleHost,
};
use indextree::{Arena, Node, NodeId};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::dom::{DOMSubscriber, DOMUpdate, NodeKey};
use crate::layout::{LayoutRect, layout_document};
use crate::style::{ComputedStyle, InlineStyle, current_style_key, legacy_current_style};

/// First key handed to nodes the page creates itself (capability probes).
const INTERNAL_KEY_BASE: u64 = 1 << 48;

/// Style of the wrapper holding a capability probe.
const PROBE_WRAPPER_STYLE: &str = "position: absolute; border: 0; width: 0; height: 0; top: 0; left: -9999px";

/// Which engine behaviour the page imitates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EngineMode {
    /// Standards engine: `getComputedStyle` with hyphenated names and
    /// `min-height` following `box-sizing`.
    #[default]
    Standard,
    /// Legacy engine: styles read through a camel-cased `currentStyle`
    /// table, `box-sizing` reported only as `-ms-box-sizing`, and
    /// `min-height` always treated as a content-box length.
    Legacy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
}

/// Loading state of an `<img>`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImageState {
    pub natural_height: f64,
    pub loaded: bool,
}

#[derive(Debug, Clone)]
pub struct PageNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    pub classes: SmallVec<String, 2>,
    pub inline: InlineStyle,
    pub computed: ComputedStyle,
    pub image: Option<ImageState>,
}

impl PageNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        let image = matches!(&kind, NodeKind::Element { tag } if tag == "img").then(ImageState::default);
        let inline = InlineStyle::default();
        Self {
            key,
            kind,
            attrs: SmallVec::new(),
            classes: SmallVec::new(),
            computed: ComputedStyle::from_inline(&inline),
            inline,
            image,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document => None,
        }
    }

    /// Content height contributed by a loaded image.
    pub fn image_height(&self) -> f64 {
        self.image
            .filter(|image| image.loaded)
            .map_or(0.0, |image| image.natural_height)
    }

    fn restyle(&mut self) {
        self.computed = ComputedStyle::from_inline(&self.inline);
    }
}

/// A registered event listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    pub target: EventTarget<NodeKey>,
    pub kind: EventKind,
}

/// An in-memory document laid out for a fixed-width viewport.
#[derive(Debug)]
pub struct Page {
    arena: Arena<PageNode>,
    root: NodeId,
    nodes: FxHashMap<NodeKey, NodeId>,
    mode: EngineMode,
    viewport_width: f64,
    layout: FxHashMap<NodeKey, LayoutRect>,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
    next_internal_key: u64,
    probe_wrappers: FxHashMap<NodeKey, NodeKey>,
    finished: bool,
}

impl Page {
    /// Create an empty document (only the root node).
    pub fn new(mode: EngineMode, viewport_width: f64) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(PageNode::new(NodeKey::ROOT, NodeKind::Document));
        let mut nodes = FxHashMap::default();
        nodes.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            nodes,
            mode,
            viewport_width,
            layout: FxHashMap::default(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            next_internal_key: INTERNAL_KEY_BASE,
            probe_wrappers: FxHashMap::default(),
            finished: false,
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Whether `EndOfDocument` has been applied.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Number of nodes including the document root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, key: NodeKey) -> Option<&PageNode> {
        self.nodes
            .get(&key)
            .and_then(|id| self.arena.get(*id))
            .map(Node::get)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut PageNode> {
        let id = *self
            .nodes
            .get(&key)
            .ok_or_else(|| anyhow!("unknown node {key:?}"))?;
        self.arena
            .get_mut(id)
            .map(Node::get_mut)
            .ok_or_else(|| anyhow!("node {key:?} was removed"))
    }

    /// Border-box geometry from the last reflow.
    pub fn layout_rect(&self, key: NodeKey) -> Option<LayoutRect> {
        self.layout.get(&key).copied()
    }

    /// Rendered border-box height from the last reflow.
    pub fn rendered_height(&self, key: NodeKey) -> Option<f64> {
        self.layout_rect(key).map(|rect| rect.height)
    }

    /// Inline style text of an element.
    pub fn style_text(&self, key: NodeKey) -> Option<String> {
        self.node(key).map(|node| node.inline.to_css_text())
    }

    /// Recompute geometry for every node.
    pub fn reflow(&mut self) {
        let quirk = self.mode == EngineMode::Legacy;
        let by_id = layout_document(&self.arena, self.root, self.viewport_width, quirk);
        self.layout = by_id
            .into_iter()
            .filter_map(|(id, rect)| self.arena.get(id).map(|node| (node.get().key, rect)))
            .collect();
        trace!("headless_page: reflowed {} box(es)", self.layout.len());
    }

    /// The first `<body>` element, if any.
    pub fn body(&self) -> Option<NodeKey> {
        self.root
            .descendants(&self.arena)
            .filter_map(|id| self.arena.get(id).map(Node::get))
            .find(|node| node.tag() == Some("body"))
            .map(|node| node.key)
    }

    fn insert(&mut self, parent: NodeKey, node: NodeKey, tag: &str, pos: usize) -> Result<()> {
        if self.nodes.contains_key(&node) {
            bail!("node {node:?} already exists");
        }
        let parent_id = *self
            .nodes
            .get(&parent)
            .ok_or_else(|| anyhow!("unknown parent {parent:?}"))?;
        let id = self.arena.new_node(PageNode::new(
            node,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        ));
        let sibling = parent_id.children(&self.arena).nth(pos);
        let attached = match sibling {
            Some(sibling) => sibling.checked_insert_before(id, &mut self.arena),
            None => parent_id.checked_append(id, &mut self.arena),
        };
        attached.map_err(|err| anyhow!("cannot insert {node:?} under {parent:?}: {err:?}"))?;
        self.nodes.insert(node, id);
        Ok(())
    }

    fn remove(&mut self, node: NodeKey) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("the document node cannot be removed");
        }
        let id = *self
            .nodes
            .get(&node)
            .ok_or_else(|| anyhow!("unknown node {node:?}"))?;
        let removed: Vec<NodeKey> = id
            .descendants(&self.arena)
            .filter_map(|child| self.arena.get(child).map(|entry| entry.get().key))
            .collect();
        id.remove_subtree(&mut self.arena);
        for key in removed {
            self.nodes.remove(&key);
            self.layout.remove(&key);
        }
        Ok(())
    }

    fn set_attr(&mut self, key: NodeKey, name: &str, value: &str) -> Result<()> {
        let node = self.node_mut(key)?;
        match name.to_ascii_lowercase().as_str() {
            "class" => {
                node.classes = value.split_whitespace().map(str::to_owned).collect();
            }
            "style" => {
                node.inline = InlineStyle::parse(value);
                node.restyle();
            }
            other => {
                if let Some(slot) = node.attrs.iter_mut().find(|(attr, _)| attr == other) {
                    value.clone_into(&mut slot.1);
                } else {
                    node.attrs.push((other.to_owned(), value.to_owned()));
                }
            }
        }
        Ok(())
    }

    fn set_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<()> {
        let node = self.node_mut(key)?;
        node.inline.set(property, value);
        node.restyle();
        Ok(())
    }

    fn mint_key(&mut self) -> NodeKey {
        let key = NodeKey(self.next_internal_key);
        self.next_internal_key += 1;
        key
    }

    /// Return an event for `(target, kind)` if anything listens for it.
    pub fn dispatch(&self, target: EventTarget<NodeKey>, kind: EventKind) -> Option<HostEvent<NodeKey>> {
        self.has_listener(target, kind)
            .then_some(HostEvent { target, kind })
    }

    pub fn has_listener(&self, target: EventTarget<NodeKey>, kind: EventKind) -> bool {
        self.listeners
            .values()
            .any(|listener| listener.target == target && listener.kind == kind)
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Change the viewport width, reflow, and fire `resize` on the window.
    pub fn resize_viewport(&mut self, width: f64) -> Option<HostEvent<NodeKey>> {
        debug!("headless_page: viewport {} -> {width}", self.viewport_width);
        self.viewport_width = width;
        self.reflow();
        self.dispatch(EventTarget::Window, EventKind::Resize)
    }

    /// Finish loading an image with the given natural height, reflow, and
    /// fire `load` on it.
    ///
    /// # Errors
    ///
    /// Returns an error if `image` is not an `<img>` element of this page.
    pub fn load_image(&mut self, image: NodeKey, natural_height: f64) -> Result<Option<HostEvent<NodeKey>>> {
        let node = self.node_mut(image)?;
        let Some(state) = node.image.as_mut() else {
            bail!("{image:?} is not an image");
        };
        state.natural_height = natural_height;
        state.loaded = true;
        self.reflow();
        Ok(self.dispatch(EventTarget::Node(image), EventKind::Load))
    }

    /// Nearest positioned ancestor, or the body.
    fn offset_parent(&self, id: NodeId) -> Option<NodeId> {
        id.ancestors(&self.arena).skip(1).find(|ancestor| {
            self.arena.get(*ancestor).map(Node::get).is_some_and(|node| {
                node.computed.is_positioned() || node.tag() == Some("body")
            })
        })
    }

    fn rect(&self, key: NodeKey) -> Result<LayoutRect> {
        self.layout
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("{key:?} has no layout box"))
    }
}

impl DOMSubscriber for Page {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => self.insert(parent, node, &tag, pos)?,
            DOMUpdate::SetAttr { node, name, value } => self.set_attr(node, &name, &value)?,
            DOMUpdate::SetStyle {
                node,
                property,
                value,
            } => self.set_style(node, &property, &value)?,
            DOMUpdate::RemoveNode { node } => self.remove(node)?,
            DOMUpdate::EndOfDocument => {
                self.finished = true;
                debug!("headless_page: document complete, {} node(s)", self.nodes.len());
            }
        }
        self.reflow();
        Ok(())
    }
}

impl SelectionHost for Page {
    type Node = NodeKey;

    fn query_class(&self, root: NodeKey, class: &str) -> Vec<NodeKey> {
        let Some(root_id) = self.nodes.get(&root) else {
            return Vec::new();
        };
        root_id
            .descendants(&self.arena)
            .skip(1)
            .filter_map(|id| self.arena.get(id).map(Node::get))
            .filter(|node| node.classes.iter().any(|token| token == class))
            .map(|node| node.key)
            .collect()
    }

    fn descendant_images(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.nodes.get(&node) else {
            return Vec::new();
        };
        id.descendants(&self.arena)
            .skip(1)
            .filter_map(|child| self.arena.get(child).map(Node::get))
            .filter(|entry| entry.image.is_some())
            .map(|entry| entry.key)
            .collect()
    }
}

impl StyleHost for Page {
    fn computed_value(&self, node: NodeKey, property: &str) -> Option<String> {
        let entry = self.node(node)?;
        let reported = entry.computed.reported(&entry.inline);
        match self.mode {
            EngineMode::Standard => reported
                .into_iter()
                .find(|(name, _)| name == property)
                .map(|(_, value)| value),
            EngineMode::Legacy => {
                let key = current_style_key(property);
                legacy_current_style(reported)
                    .into_iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| value)
            }
        }
    }

    fn inline_min_height(&self, node: NodeKey) -> String {
        self.node(node)
            .and_then(|entry| entry.inline.get("min-height"))
            .unwrap_or_default()
            .to_owned()
    }

    fn set_inline_min_height(&mut self, node: NodeKey, value: &str) -> Result<()> {
        self.set_style(node, "min-height", value)?;
        trace!("headless_page: {node:?} min-height = {value:?}");
        self.reflow();
        Ok(())
    }
}

impl GeometryHost for Page {
    fn offset_top(&self, node: NodeKey) -> Result<f64> {
        let rect = self.rect(node)?;
        let id = *self
            .nodes
            .get(&node)
            .ok_or_else(|| anyhow!("unknown node {node:?}"))?;
        let Some(parent) = self.offset_parent(id) else {
            return Ok(rect.y);
        };
        let parent_node = self.arena[parent].get();
        let parent_rect = self.rect(parent_node.key)?;
        Ok(rect.y - parent_rect.y - parent_node.computed.border_top.used_width())
    }

    fn bounding_height(&self, node: NodeKey) -> Result<f64> {
        Ok(self.rect(node)?.height)
    }

    fn offset_height(&self, node: NodeKey) -> Result<f64> {
        Ok(self.rect(node)?.height.round())
    }
}

impl ProbeHost for Page {
    fn insert_offscreen_probe(&mut self, declarations: &[(&str, &str)]) -> Result<NodeKey> {
        let body = self
            .body()
            .ok_or_else(|| anyhow!("document has no body to attach a probe to"))?;
        let wrapper = self.mint_key();
        let probe = self.mint_key();
        self.insert(body, wrapper, "div", usize::MAX)?;
        self.set_attr(wrapper, "style", PROBE_WRAPPER_STYLE)?;
        self.insert(wrapper, probe, "div", 0)?;
        for (property, value) in declarations {
            self.set_style(probe, property, value)?;
        }
        self.probe_wrappers.insert(probe, wrapper);
        self.reflow();
        Ok(probe)
    }

    fn remove_probe(&mut self, probe: NodeKey) -> Result<()> {
        let wrapper = self
            .probe_wrappers
            .remove(&probe)
            .ok_or_else(|| anyhow!("{probe:?} is not a live probe"))?;
        self.remove(wrapper)?;
        self.reflow();
        Ok(())
    }
}

impl EventHost for Page {
    fn add_listener(&mut self, target: EventTarget<NodeKey>, kind: EventKind) -> Result<ListenerId> {
        if let EventTarget::Node(node) = target
            && !self.nodes.contains_key(&node)
        {
            bail!("cannot listen on unknown node {node:?}");
        }
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, Listener { target, kind });
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) -> Result<()> {
        self.listeners
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("listener {id:?} is not registered"))
    }
}

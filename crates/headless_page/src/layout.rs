//! A deliberately small flow layout.
//!
//! In-flow children are packed left to right and wrap into a new row when
//! the next child no longer fits the parent's width; a child without a
//! declared width fills the row on its own. A row is as tall as its tallest
//! box and the next row starts at its bottom edge. Absolutely positioned
//! children leave the flow and sit `top` pixels below their parent's padding
//! edge.
//!
//! Heights are border-box. An auto height is the sum of the child rows plus
//! any loaded image content, a declared height follows `box-sizing`, and the
//! result is raised to the used `min-height`.

use indextree::{Arena, Node, NodeId};
use rustc_hash::FxHashMap;

use crate::page::{NodeKind, PageNode};
use crate::style::{BoxSizing, ComputedStyle};

/// Slack for float comparisons when packing rows.
const FIT_EPSILON: f64 = 1e-6;

/// Border-box geometry in document coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayoutRect {
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Border-box height after applying `min-height`.
///
/// `content_box_min_height` models engines that read `min-height` as a
/// content-box length whatever the declared `box-sizing`.
pub fn apply_min_height(style: &ComputedStyle, border_box: f64, content_box_min_height: bool) -> f64 {
    let Some(min_height) = style.min_height else {
        return border_box;
    };
    let cushion = style.cushion();
    let minimum = if content_box_min_height || style.box_sizing == BoxSizing::ContentBox {
        min_height + cushion
    } else {
        min_height.max(cushion)
    };
    border_box.max(minimum)
}

/// Lay out the whole document for a viewport `viewport_width` pixels wide.
pub fn layout_document(
    arena: &Arena<PageNode>,
    root: NodeId,
    viewport_width: f64,
    content_box_min_height: bool,
) -> FxHashMap<NodeId, LayoutRect> {
    let mut out = FxHashMap::default();
    let mut context = Context {
        arena,
        content_box_min_height,
        out: &mut out,
    };
    let mut cursor = 0.0;
    for child in root.children(arena) {
        if is_element(arena, child) {
            cursor += context.layout_box(child, cursor, viewport_width);
        }
    }
    out
}

fn is_element(arena: &Arena<PageNode>, id: NodeId) -> bool {
    arena
        .get(id)
        .is_some_and(|node| matches!(node.get().kind, NodeKind::Element { .. }))
}

struct Context<'arena, 'out> {
    arena: &'arena Arena<PageNode>,
    content_box_min_height: bool,
    out: &'out mut FxHashMap<NodeId, LayoutRect>,
}

impl Context<'_, '_> {
    /// Lay out `id` with its border-box top at `y`; returns its border-box height.
    fn layout_box(&mut self, id: NodeId, y: f64, available_width: f64) -> f64 {
        let Some(node) = self.arena.get(id).map(Node::get) else {
            return 0.0;
        };
        let style = &node.computed;
        let width = style.width.unwrap_or(available_width).max(0.0);
        let padding_edge = y + style.border_top.used_width();
        let content_top = padding_edge + style.padding_top;

        let mut rows_height = 0.0;
        let mut row_x = 0.0;
        let mut row_height: f64 = 0.0;
        let mut positioned = Vec::new();
        for child in id.children(self.arena) {
            let Some(child_node) = self.arena.get(child).map(Node::get) else {
                continue;
            };
            if !matches!(child_node.kind, NodeKind::Element { .. }) {
                continue;
            }
            if child_node.computed.absolute {
                positioned.push((child, child_node.computed.top));
                continue;
            }
            let child_width = child_node.computed.width.unwrap_or(width).max(0.0);
            if row_x > 0.0 && row_x + child_width > width + FIT_EPSILON {
                rows_height += row_height;
                row_x = 0.0;
                row_height = 0.0;
            }
            let child_height = self.layout_box(child, content_top + rows_height, child_width);
            row_x += child_width;
            row_height = row_height.max(child_height);
        }
        rows_height += row_height;

        for (child, top) in positioned {
            self.layout_box(child, padding_edge + top, width);
        }

        let cushion = style.cushion();
        let content = match style.height {
            Some(declared) if style.box_sizing == BoxSizing::BorderBox => (declared - cushion).max(0.0),
            Some(declared) => declared.max(0.0),
            None => rows_height + node.image_height(),
        };
        let height = apply_min_height(style, content + cushion, self.content_box_min_height);

        self.out.insert(id, LayoutRect { y, width, height });
        height
    }
}

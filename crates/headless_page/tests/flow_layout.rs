use equal_align::{GeometryHost as _, StyleHost as _};
use headless_page::{DOMSubscriber as _, DOMUpdate, EngineMode, NodeKey, Page, PageBuilder};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn fixed_width_boxes_wrap_into_rows() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::new(EngineMode::Standard).viewport_width(600.0);
    let list = builder.div(NodeKey::BODY, "list", "");
    let first = builder.div(list, "item", "width: 300px; height: 120px");
    let second = builder.div(list, "item", "width: 300px; height: 150px");
    let third = builder.div(list, "item", "width: 300px; height: 100px");
    let page = builder.build().unwrap();

    assert_close(page.offset_top(first).unwrap(), 0.0);
    assert_close(page.offset_top(second).unwrap(), 0.0);
    assert_close(page.offset_top(third).unwrap(), 150.0);
    assert_close(page.rendered_height(list).unwrap(), 250.0);
    assert_close(page.bounding_height(second).unwrap(), 150.0);
}

#[test]
fn box_sizing_controls_declared_height() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default();
    let content_box = builder.div(
        NodeKey::BODY,
        "",
        "width: 100px; height: 50px; padding-top: 10px; border: 2px solid",
    );
    let border_box = builder.div(
        NodeKey::BODY,
        "",
        "width: 100px; height: 50px; padding-top: 10px; box-sizing: border-box",
    );
    let page = builder.build().unwrap();

    assert_close(page.offset_height(content_box).unwrap(), 64.0);
    assert_close(page.offset_height(border_box).unwrap(), 50.0);
    // both fit in one row of the default viewport
    assert_close(page.offset_top(border_box).unwrap(), 0.0);
}

#[test]
fn inline_min_height_raises_and_clears() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default();
    let boxed = builder.div(NodeKey::BODY, "", "height: 40px; min-height: 10px");
    let mut page = builder.build().unwrap();

    assert_eq!(page.inline_min_height(boxed), "10px");
    page.set_inline_min_height(boxed, "100px").unwrap();
    assert_close(page.offset_height(boxed).unwrap(), 100.0);
    page.set_inline_min_height(boxed, "").unwrap();
    assert_eq!(page.inline_min_height(boxed), "");
    assert_close(page.offset_height(boxed).unwrap(), 40.0);
    assert_eq!(page.style_text(boxed).as_deref(), Some("height: 40px;"));
}

#[test]
fn offset_top_is_measured_from_positioned_ancestor_padding_edge() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default();
    let container = builder.div(
        NodeKey::BODY,
        "",
        "position: relative; border: 5px solid; padding-top: 7px",
    );
    let in_flow = builder.div(container, "", "height: 20px");
    let absolute = builder.div(container, "", "position: absolute; top: 10px; height: 5px");
    let page = builder.build().unwrap();

    assert_close(page.offset_top(in_flow).unwrap(), 7.0);
    assert_close(page.offset_top(absolute).unwrap(), 10.0);
    // the absolute child does not contribute to the container height
    assert_close(page.offset_height(container).unwrap(), 5.0 + 7.0 + 20.0 + 5.0);
}

#[test]
fn removing_a_node_drops_its_subtree() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default();
    let outer = builder.div(NodeKey::BODY, "", "");
    let inner = builder.div(outer, "", "height: 30px");
    let mut page = builder.build().unwrap();
    let before = page.node_count();

    page.apply_update(DOMUpdate::RemoveNode { node: outer }).unwrap();

    assert_eq!(page.node_count(), before - 2);
    assert!(!page.contains(inner));
    assert_eq!(page.rendered_height(inner), None);
    let err = page.offset_top(inner).unwrap_err();
    assert!(err.to_string().contains("no layout box"));
}

#[test]
fn updates_for_unknown_nodes_are_rejected() {
    let mut page = Page::new(EngineMode::Standard, 800.0);
    let err = page
        .apply_update(DOMUpdate::InsertElement {
            parent: NodeKey(42),
            node: NodeKey(43),
            tag: "div".into(),
            pos: 0,
        })
        .unwrap_err();
    assert!(err.to_string().contains("unknown parent"));

    let err = page
        .apply_update(DOMUpdate::RemoveNode { node: NodeKey::ROOT })
        .unwrap_err();
    assert!(err.to_string().contains("cannot be removed"));
    assert!(!page.is_finished());
}

#[test]
fn insert_position_orders_siblings() {
    let mut page = Page::new(EngineMode::Standard, 800.0);
    let updates = vec![
        DOMUpdate::InsertElement { parent: NodeKey::ROOT, node: NodeKey::HTML, tag: "html".into(), pos: 0 },
        DOMUpdate::InsertElement { parent: NodeKey::HTML, node: NodeKey::BODY, tag: "body".into(), pos: 0 },
        DOMUpdate::InsertElement { parent: NodeKey::BODY, node: NodeKey(10), tag: "div".into(), pos: 0 },
        DOMUpdate::InsertElement { parent: NodeKey::BODY, node: NodeKey(11), tag: "div".into(), pos: 0 },
        DOMUpdate::SetStyle { node: NodeKey(10), property: "height".into(), value: "30px".into() },
        DOMUpdate::SetStyle { node: NodeKey(11), property: "height".into(), value: "20px".into() },
        DOMUpdate::EndOfDocument,
    ];
    page.apply_batch(updates).unwrap();

    assert!(page.is_finished());
    // node 11 was inserted before node 10, and auto-width boxes fill a row each
    assert_close(page.offset_top(NodeKey(11)).unwrap(), 0.0);
    assert_close(page.offset_top(NodeKey(10)).unwrap(), 20.0);
}

#[test]
fn builder_records_updates_in_order() {
    let mut builder = PageBuilder::default();
    let card = builder.div(NodeKey::BODY, "item", "height: 10px");

    let updates = builder.updates();
    assert_eq!(updates.len(), 5);
    assert_eq!(
        updates[2],
        DOMUpdate::InsertElement {
            parent: NodeKey::BODY,
            node: card,
            tag: "div".into(),
            pos: usize::MAX,
        }
    );
    assert_eq!(
        updates[4],
        DOMUpdate::SetAttr {
            node: card,
            name: "style".into(),
            value: "height: 10px".into(),
        }
    );

    let page = builder.build().unwrap();
    assert!(page.is_finished());
    assert_close(page.offset_height(card).unwrap(), 10.0);
}

use std::cell::RefCell;
use std::rc::Rc;

use equal_align::{
    AlignConfig, EngineProfile, EqualAlign, EventKind, EventTarget, GeometryHost as _, HostEvent, Lifecycle,
    MinHeightModel, PassReport, PassTrigger, PropertyLookup, RunHooks, StyleHost as _,
};
use headless_page::{DOMSubscriber as _, DOMUpdate, EngineMode, NodeKey, Page, PageBuilder};

fn height(page: &Page, node: NodeKey) -> f64 {
    page.offset_height(node).unwrap()
}

/// 300px-wide items: two per row at 600px, one per row at 300px.
fn wrapping_row() -> (Page, NodeKey, [NodeKey; 3]) {
    let mut builder = PageBuilder::new(EngineMode::Standard).viewport_width(600.0);
    let list = builder.div(NodeKey::BODY, "", "");
    let first = builder.div(list, "item", "width: 300px; height: 120px; min-height: 10px");
    let second = builder.div(list, "item", "width: 300px; height: 150px");
    let third = builder.div(list, "item", "width: 300px; height: 100px");
    (builder.build().unwrap(), list, [first, second, third])
}

#[test]
fn construction_subscribes_to_resize_and_image_loads() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default();
    let list = builder.div(NodeKey::BODY, "", "");
    let card = builder.div(list, "item", "width: 200px");
    let image = builder.img(card, "width: 200px");
    let other = builder.img(list, "");
    let mut page = builder.build().unwrap();

    let aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());

    assert_eq!(aligner.subscriptions().len(), 2);
    assert_eq!(page.listener_count(), 2);
    assert!(page.has_listener(EventTarget::Window, EventKind::Resize));
    assert!(page.has_listener(EventTarget::Node(image), EventKind::Load));
    assert!(!page.has_listener(EventTarget::Node(other), EventKind::Load));
    let triggers: Vec<PassTrigger> = aligner.subscriptions().iter().map(|sub| sub.trigger).collect();
    assert_eq!(triggers, vec![PassTrigger::ResetThenRun, PassTrigger::ResetThenRun]);
}

#[test]
fn widening_the_viewport_realigns_the_new_row() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut page, list, [first, second, third]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    assert!((height(&page, first) - 150.0).abs() < f64::EPSILON);
    assert!((height(&page, third) - 100.0).abs() < f64::EPSILON);

    let event = page.resize_viewport(900.0).unwrap();
    let report = aligner.handle_event(&mut page, &event).unwrap();

    assert_eq!(report.adjusted, 2);
    for node in [first, second, third] {
        assert!((height(&page, node) - 150.0).abs() < f64::EPSILON);
    }
}

#[test]
fn narrowing_the_viewport_clears_stale_overrides() {
    let (mut page, list, [first, _, _]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    assert_eq!(page.inline_min_height(first), "150px");

    let event = page.resize_viewport(300.0).unwrap();
    let report = aligner.handle_event(&mut page, &event).unwrap();

    assert_eq!(report.adjacent, 0);
    // the reset writes an empty value, not the original one
    assert_eq!(page.inline_min_height(first), "");
    assert!((height(&page, first) - 120.0).abs() < f64::EPSILON);
}

#[test]
fn update_keeps_existing_overrides() {
    let (mut page, list, [first, _, _]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());

    page.resize_viewport(300.0);
    aligner.update(&mut page);

    assert_eq!(page.inline_min_height(first), "150px");
}

#[test]
fn image_load_triggers_a_pass() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut builder = PageBuilder::default().viewport_width(400.0);
    let list = builder.div(NodeKey::BODY, "", "");
    let card = builder.div(list, "item", "width: 200px");
    let image = builder.img(card, "width: 200px");
    let text = builder.div(list, "item", "width: 200px; height: 100px");
    let mut page = builder.build().unwrap();

    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    assert!((height(&page, text) - 100.0).abs() < f64::EPSILON);

    let event = page.load_image(image, 150.0).unwrap().unwrap();
    let report = aligner.handle_event(&mut page, &event).unwrap();

    assert_eq!(report.adjusted, 1);
    assert_eq!(page.inline_min_height(text), "150px");
    assert!((height(&page, card) - 150.0).abs() < f64::EPSILON);
    assert!((height(&page, text) - 150.0).abs() < f64::EPSILON);
}

#[test]
fn unrelated_events_are_ignored() {
    let (mut page, list, [first, ..]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());

    let stray = HostEvent {
        target: EventTarget::Node(first),
        kind: EventKind::Load,
    };
    assert_eq!(aligner.handle_event(&mut page, &stray), None);
}

#[test]
fn destroy_restores_original_min_heights_and_listeners() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut page, list, [first, second, third]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    assert_eq!(page.listener_count(), 1);

    aligner.destroy(&mut page);

    assert_eq!(aligner.lifecycle(), Lifecycle::Destroyed);
    assert_eq!(page.listener_count(), 0);
    assert!(aligner.subscriptions().is_empty());
    assert!(aligner.tracked().is_empty());
    assert_eq!(page.inline_min_height(first), "10px");
    assert_eq!(page.inline_min_height(second), "");
    assert_eq!(page.inline_min_height(third), "");
    assert!((height(&page, first) - 120.0).abs() < f64::EPSILON);

    // second teardown is a no-op
    aligner.destroy(&mut page);
    assert_eq!(page.listener_count(), 0);
    assert_eq!(page.inline_min_height(first), "10px");
}

#[test]
fn nothing_runs_after_destroy() {
    let (mut page, list, [first, ..]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    aligner.destroy(&mut page);

    assert_eq!(page.resize_viewport(900.0), None);
    let resize = HostEvent {
        target: EventTarget::Window,
        kind: EventKind::Resize,
    };
    assert_eq!(aligner.handle_event(&mut page, &resize), None);
    assert_eq!(aligner.update(&mut page).pairs, 0);
    assert_eq!(aligner.run(&mut page).pairs, 0);
    assert_eq!(page.inline_min_height(first), "10px");
}

#[test]
fn hooks_wrap_the_first_pass() {
    let (mut page, list, [first, ..]) = wrapping_row();
    let log = Rc::new(RefCell::new(Vec::new()));

    let before_log = Rc::clone(&log);
    let after_log = Rc::clone(&log);
    let hooks = RunHooks::default()
        .before_run(move || before_log.borrow_mut().push("before"))
        .after_run(move || after_log.borrow_mut().push("after"));
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), hooks);

    assert_eq!(*log.borrow(), vec!["before", "after"]);
    assert_eq!(page.inline_min_height(first), "150px");

    // later passes do not fire hooks again
    aligner.update(&mut page);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn shared_images_get_one_load_listener() {
    let mut builder = PageBuilder::default();
    let list = builder.div(NodeKey::BODY, "", "");
    let card = builder.div(list, "item wide", "width: 200px");
    let image = builder.img(card, "width: 200px");
    let mut page = builder.build().unwrap();

    let config = AlignConfig::default().with_target_class(["item", "wide"]);
    let aligner = EqualAlign::new(&mut page, Some(list), config, RunHooks::default());

    assert_eq!(aligner.tracked().len(), 2);
    let loads = aligner
        .subscriptions()
        .iter()
        .filter(|sub| sub.target == EventTarget::Node(image) && sub.kind == EventKind::Load)
        .count();
    assert_eq!(loads, 1);
    assert_eq!(page.listener_count(), 2);
}

#[test]
fn bodyless_document_falls_back_to_default_profile() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut page = Page::new(EngineMode::Standard, 800.0);
    let aligner = EqualAlign::new(&mut page, Some(NodeKey::ROOT), AlignConfig::default(), RunHooks::default());

    assert_eq!(
        aligner.profile(),
        EngineProfile {
            min_height: MinHeightModel::Declared,
            lookup: PropertyLookup::PrefixFallback,
        }
    );
    assert!(aligner.tracked().is_empty());
    assert!(aligner.is_active());
}

#[test]
fn pairs_with_a_removed_element_are_skipped() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut page, list, [first, second, third]) = wrapping_row();
    let mut aligner = EqualAlign::new(&mut page, Some(list), AlignConfig::default(), RunHooks::default());
    assert_eq!(page.inline_min_height(first), "150px");

    page.apply_update(DOMUpdate::RemoveNode { node: third }).unwrap();
    let report = aligner.update(&mut page);

    // only the surviving pair is readable, and it is already level
    assert_eq!(
        report,
        PassReport {
            pairs: 3,
            adjacent: 1,
            adjusted: 0,
        }
    );

    aligner.destroy(&mut page);
    assert_eq!(page.inline_min_height(first), "10px");
    assert_eq!(page.inline_min_height(second), "");
    assert_eq!(page.listener_count(), 0);
}

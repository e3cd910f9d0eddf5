//! End-to-end monitor flows over the header fixture
//!
//! Each test drives the monitor the way a host would: tree edits followed
//! by batch delivery, pointer events, timer polls and bus signals.

use super::common::fixtures::MenuFixture;
use menu_monitor::{MonitorConfig, MutationKind, NodeSnapshot, Topic, Tree};

/// Hover past the duration commits the open session and publishes it
#[test]
fn test_hover_commit_publishes_menu_open() {
    let mut fx = MenuFixture::new();
    fx.open(fx.products);
    fx.enter(fx.pricing);

    assert!(!fx.advance(2999), "timer must not fire early");
    assert!(fx.advance(1), "timer fires at the deadline");

    let event = fx
        .monitor
        .bus()
        .last(Topic::MenuOpen)
        .expect("menu-open published");
    assert_eq!(event.mutations.len(), 1);
    assert_eq!(event.mutations[0].kind, MutationKind::AttributeChange);
    assert_eq!(event.mutations[0].attribute_name.as_deref(), Some("class"));
    assert_eq!(event.mutations[0].target, fx.products);

    assert_eq!(fx.monitor.menu_name(), "Pricing");
    assert_eq!(fx.monitor.committed().buffer.len(), 1);
}

/// Leaving before the deadline cancels the commit
#[test]
fn test_short_hover_never_commits() {
    let mut fx = MenuFixture::new();
    fx.open(fx.products);
    fx.enter(fx.products);
    fx.advance(1000);
    fx.monitor.pointer_leave();

    assert!(!fx.advance(5000));
    assert_eq!(fx.monitor.bus().count(Topic::MenuOpen), 0);
    assert!(fx.monitor.committed().is_empty());
    assert!(fx.monitor.recorder().is_recording());
}

/// Re-entering restarts the countdown
#[test]
fn test_reentering_rearms_timer() {
    let mut fx = MenuFixture::new();
    fx.open(fx.products);
    fx.enter(fx.products);
    fx.advance(2000);
    fx.enter(fx.pricing);

    assert!(!fx.advance(2000));
    assert!(fx.advance(1000));
    assert_eq!(fx.monitor.bus().count(Topic::MenuOpen), 1);
}

/// Reopen restores the committed class; a revealed submenu also asks the
/// host to close its own overlay
#[test]
fn test_reopen_restores_class_and_visibility() {
    let mut fx = MenuFixture::new();
    let (products, submenu) = (fx.products, fx.submenu);
    fx.open(products);
    fx.mutate(|doc| doc.set_display(submenu, Some("block")).expect("show submenu"));
    fx.hover_commit(products);

    fx.close(products);
    fx.mutate(|doc| doc.set_display(submenu, None).expect("hide submenu"));
    assert!(!fx.is_active(products));
    assert_eq!(fx.tree().computed_display(submenu), "none");

    fx.monitor.reopen_menu();

    assert!(fx.is_active(products));
    assert_eq!(fx.tree().computed_display(submenu), "block");
    assert_eq!(
        fx.monitor.bus().topics(),
        vec![Topic::MenuOpen, Topic::MenuCloseRequired]
    );
}

/// Without a visibility or disclosure delta no close request is published
#[test]
fn test_reopen_without_deltas_is_silent() {
    let mut fx = MenuFixture::new();
    let products = fx.products;
    fx.open(products);
    fx.hover_commit(products);
    fx.close(products);

    fx.monitor.reopen_menu();

    assert!(fx.is_active(products));
    assert_eq!(fx.monitor.bus().topics(), vec![Topic::MenuOpen]);
}

/// A disclosure opened during the session is reopened on replay and asks
/// for a close exactly once
#[test]
fn test_reopen_restores_disclosure_delta() {
    let mut fx = MenuFixture::new();
    let (products, faq) = (fx.products, fx.faq);
    fx.open(products);
    fx.mutate(|doc| doc.set_attribute(faq, "open", "").expect("open faq"));
    fx.hover_commit(products);

    let deltas = &fx.monitor.committed().deltas;
    assert_eq!(deltas.disclosure, Some(faq));
    assert!(deltas.visibility.is_none());

    fx.close(products);
    fx.mutate(|doc| doc.remove_attribute(faq, "open").expect("close faq"));

    fx.monitor.reopen_menu();

    assert_eq!(fx.tree().attribute(faq, "open").as_deref(), Some("true"));
    assert_eq!(
        fx.tree().attribute(faq, "aria-expanded").as_deref(),
        Some("true")
    );
    assert_eq!(fx.monitor.bus().count(Topic::MenuCloseRequired), 1);
    assert_eq!(
        fx.monitor.bus().topics(),
        vec![Topic::MenuOpen, Topic::MenuCloseRequired]
    );
}

/// Attachment records the hidden submenu and the closed disclosure
#[test]
fn test_baseline_tracks_hidden_and_closed_nodes() {
    let fx = MenuFixture::new();
    assert_eq!(fx.monitor.baseline().hidden(), &[fx.submenu]);
    assert_eq!(fx.monitor.baseline().disclosures(), &[fx.faq]);
}

/// Configured open markers replace the defaults
#[test]
fn test_custom_open_markers() {
    let config = MonitorConfig::default().with_open_markers(["is-open"]);
    let mut fx = MenuFixture::with_config(config);
    assert_eq!(fx.monitor.config().open_markers, vec!["is-open"]);

    let products = fx.products;
    fx.open(products);
    assert!(!fx.monitor.recorder().is_recording());

    fx.mutate(|doc| doc.add_class(products, "is-open").expect("add class"));
    assert!(fx.monitor.recorder().is_recording());
}

/// Close reverts tracked nodes and publishes exactly one hide event
#[test]
fn test_close_resets_tracked_nodes() {
    let mut fx = MenuFixture::new();
    let (products, submenu, faq) = (fx.products, fx.submenu, fx.faq);
    fx.open(products);
    fx.mutate(|doc| {
        doc.set_display(submenu, Some("block")).expect("show submenu");
        doc.set_attribute(faq, "open", "").expect("open faq");
    });
    fx.hover_commit(products);
    assert!(!fx.monitor.committed().deltas.is_empty());

    fx.monitor.close_menu();

    assert_eq!(fx.tree().computed_display(submenu), "none");
    assert!(fx.tree().attribute(faq, "open").is_none());
    assert_eq!(fx.monitor.bus().count(Topic::HideCloseMenu), 1);
    assert!(fx.monitor.committed().deltas.is_empty());

    // Deltas are gone, so a later reopen has nothing to report
    fx.monitor.reopen_menu();
    assert_eq!(fx.monitor.bus().count(Topic::MenuCloseRequired), 0);
}

/// Close with nothing committed still publishes
#[test]
fn test_close_without_commit_publishes_hide() {
    let mut fx = MenuFixture::new();
    fx.monitor.close_menu();
    assert_eq!(fx.monitor.bus().topics(), vec![Topic::HideCloseMenu]);
}

/// Replaying twice leaves the tree as the first replay did
#[test]
fn test_replay_is_idempotent() {
    let mut fx = MenuFixture::new();
    let (products, submenu) = (fx.products, fx.submenu);

    fx.mutate(|doc| doc.add_class(submenu, "is-expanded").expect("expand"));
    let mut docs = NodeSnapshot::element("li");
    if let NodeSnapshot::Element { attrs, children, .. } = &mut docs {
        attrs.insert("data-node-id".into(), "docs".into());
        children.push(NodeSnapshot::Text("Docs".into()));
    }
    let added = fx.mutate(|doc| doc.append_snapshot(submenu, &docs).expect("append"));
    fx.hover_commit(products);

    fx.mutate(|doc| doc.detach(added).expect("detach"));
    fx.close(submenu);
    assert_eq!(fx.tree().children(submenu).len(), 1);

    fx.monitor.reopen_menu();
    assert_eq!(fx.tree().children(submenu).len(), 2);
    let replayed = fx
        .tree()
        .find_descendant(submenu, "data-node-id", "docs")
        .expect("docs restored");
    assert_eq!(fx.tree().text_content(replayed), "Docs");

    fx.monitor.reopen_menu();
    assert_eq!(fx.tree().children(submenu).len(), 2);
    assert!(fx.tree().has_class(submenu, "is-expanded"));
}

/// A new open marker starts a fresh session; the committed one survives
/// until the next commit
#[test]
fn test_new_session_clears_buffer() {
    let mut fx = MenuFixture::new();
    let (products, submenu) = (fx.products, fx.submenu);
    fx.open(products);
    fx.hover_commit(products);
    let first_session = fx.monitor.recorder().session();

    fx.close(products);
    fx.mutate(|doc| doc.add_class(submenu, "is-expanded").expect("expand"));

    assert_eq!(fx.monitor.recorder().session(), first_session + 1);
    assert_eq!(fx.monitor.recorder().buffer().len(), 1);
    assert_eq!(fx.monitor.recorder().buffer()[0].target, submenu);
    assert_eq!(fx.monitor.committed().buffer[0].target, products);

    fx.hover_commit(submenu);
    assert_eq!(fx.monitor.committed().buffer.len(), 1);
    assert_eq!(fx.monitor.committed().buffer[0].target, submenu);
}

/// Open and close inside one batch never starts a session
#[test]
fn test_open_and_close_in_one_batch_is_ignored() {
    let mut fx = MenuFixture::new();
    let products = fx.products;
    fx.mutate(|doc| {
        doc.add_class(products, "is-active").expect("open");
        doc.remove_classes(products, &["is-active".to_string()])
            .expect("close");
    });
    assert!(!fx.monitor.recorder().is_recording());
    assert_eq!(fx.monitor.recorder().session(), 0);
}

/// Changes outside the header are never recorded
#[test]
fn test_mutations_outside_root_are_ignored() {
    let mut fx = MenuFixture::new();
    let footer = fx.footer;
    fx.open(footer);
    assert!(!fx.monitor.recorder().is_recording());

    fx.enter(footer);
    assert!(!fx.advance(3000));
}

/// Force close strips open markers and tears down
#[test]
fn test_force_close_strips_markers() {
    let mut fx = MenuFixture::new();
    let (products, submenu, header) = (fx.products, fx.submenu, fx.header);
    fx.open(products);
    fx.mutate(|doc| doc.add_class(submenu, "is-expanded").expect("expand"));
    fx.mutate(|doc| doc.add_class(header, "sticky").expect("add class"));

    fx.monitor.force_close();
    fx.monitor.sync();

    assert!(!fx.is_active(products));
    assert!(!fx.tree().has_class(submenu, "is-expanded"));
    assert!(fx.tree().has_class(header, "sticky"));
    assert!(!fx.monitor.recorder().is_recording());
    assert_eq!(fx.monitor.bus().count(Topic::HideCloseMenu), 1);
}

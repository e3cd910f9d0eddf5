//! Property-based tests for capture and replay
//!
//! - Replay restores the last value an attribute had while recording
//! - Any hover shorter than the configured duration never commits

use super::common::fixtures::MenuFixture;
use menu_monitor::{Topic, Tree};
use proptest::prelude::*;

/// Attribute values, including empty and space-separated ones
fn attribute_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z0-9-]{0,12}", "[a-z]{1,6} [a-z]{1,6}",]
}

proptest! {
    #[test]
    fn replay_restores_last_recorded_value(
        values in prop::collection::vec(attribute_value_strategy(), 1..6),
        drift in "[A-Z]{1,8}",
    ) {
        let mut fx = MenuFixture::new();
        let products = fx.products;
        fx.open(products);
        for value in &values {
            fx.mutate(|doc| {
                doc.set_attribute(products, "data-state", value)
                    .expect("set attribute")
            });
        }
        fx.hover_commit(products);

        fx.mutate(|doc| {
            doc.set_attribute(products, "data-state", &drift)
                .expect("set attribute")
        });
        fx.close(products);
        fx.monitor.reopen_menu();

        let last = values.last().expect("at least one value");
        let restored = fx.tree().attribute(products, "data-state");
        prop_assert_eq!(restored.as_deref(), Some(last.as_str()));
        prop_assert!(fx.is_active(products));
    }

    #[test]
    fn short_hover_never_commits(ms in 0u64..3000) {
        let mut fx = MenuFixture::new();
        let products = fx.products;
        fx.open(products);
        fx.enter(products);

        prop_assert!(!fx.advance(ms));
        fx.monitor.pointer_leave();
        prop_assert!(!fx.advance(10_000));
        prop_assert_eq!(fx.monitor.bus().count(Topic::MenuOpen), 0);
    }
}

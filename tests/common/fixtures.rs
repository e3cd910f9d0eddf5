//! Header document fixture
//!
//! Layout (stable ids in brackets):
//!
//! ```text
//! body
//!   header [header]
//!     nav
//!       li [products] "Products"
//!       ul [submenu] hidden
//!         li [pricing] "Pricing"
//!     details [faq]
//!   footer [footer]
//! ```

use std::time::Duration;

use menu_monitor::tree::FixedRoot;
use menu_monitor::{Document, MenuMonitor, MonitorConfig, NodeId, RecordingBus, Tree};
use tokio::time::Instant;

pub const ID: &str = "data-node-id";

pub struct MenuFixture {
    pub monitor: MenuMonitor<Document, RecordingBus>,
    pub header: NodeId,
    pub products: NodeId,
    pub submenu: NodeId,
    pub pricing: NodeId,
    pub faq: NodeId,
    pub footer: NodeId,
    pub clock: Instant,
}

fn element(doc: &mut Document, parent: NodeId, tag: &str, id: &str) -> NodeId {
    let node = doc.append_element(parent, tag).expect("append element");
    doc.set_attribute(node, ID, id).expect("set stable id");
    node
}

impl MenuFixture {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        let mut doc = Document::new();
        let body = doc
            .append_element(doc.document_root(), "body")
            .expect("append body");
        let header = element(&mut doc, body, "header", "header");
        let nav = doc.append_element(header, "nav").expect("append nav");
        let products = element(&mut doc, nav, "li", "products");
        doc.append_text(products, "Products").expect("append text");
        let submenu = element(&mut doc, nav, "ul", "submenu");
        doc.set_sheet_display(submenu, "none").expect("hide submenu");
        let pricing = element(&mut doc, submenu, "li", "pricing");
        doc.append_text(pricing, "Pricing").expect("append text");
        let faq = element(&mut doc, header, "details", "faq");
        let footer = element(&mut doc, body, "footer", "footer");

        let monitor = MenuMonitor::attach(doc, RecordingBus::new(), config, &FixedRoot(header))
            .expect("monitor attaches");

        Self {
            monitor,
            header,
            products,
            submenu,
            pricing,
            faq,
            footer,
            clock: Instant::now(),
        }
    }

    pub fn tree(&self) -> &Document {
        self.monitor.tree()
    }

    /// Run `f` against the tree, then deliver the resulting batch
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(self.monitor.tree_mut());
        self.monitor.sync();
        result
    }

    pub fn open(&mut self, node: NodeId) {
        self.mutate(|doc| doc.add_class(node, "is-active").expect("add class"));
    }

    pub fn close(&mut self, node: NodeId) {
        self.mutate(|doc| {
            doc.remove_classes(node, &["is-active".to_string(), "is-expanded".to_string()])
                .expect("remove classes")
        });
    }

    pub fn enter(&mut self, node: NodeId) {
        self.monitor.pointer_enter(node, self.clock);
    }

    /// Move the clock forward and poll the hover timer
    pub fn advance(&mut self, ms: u64) -> bool {
        self.clock += Duration::from_millis(ms);
        let fired = self.monitor.poll_timer(self.clock);
        self.monitor.sync();
        fired
    }

    /// Hover `node` long enough to commit, then leave
    pub fn hover_commit(&mut self, node: NodeId) {
        self.enter(node);
        assert!(self.advance(3000), "hover should commit");
        self.monitor.pointer_leave();
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.tree().has_class(node, "is-active")
    }
}

impl Default for MenuFixture {
    fn default() -> Self {
        Self::new()
    }
}

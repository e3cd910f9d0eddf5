//! Mutation capture and replay engine
//!
//! [`MenuMonitor`] owns all engine state for one monitored root: the
//! recorder's current session, the committed session, the hover timer, the
//! attachment baseline and the observed deltas. Every entry point runs to
//! completion on `&mut self`; drivers (the tokio [`runtime`], the scenario
//! player, tests) decide when to deliver tree batches and when to poll the
//! timer.

pub mod baseline;
pub mod close;
pub mod hover;
pub mod recorder;
pub mod replay;
pub mod runtime;
pub mod snapshot;

use tokio::time::Instant;

use crate::bus::{BusSignal, EventBus, MenuEvent, Topic};
use crate::config::MonitorConfig;
use crate::tree::{MutationRecord, NodeId, RootLocator, Tree};

pub use baseline::{Baseline, Deltas};
pub use hover::{HoverController, HoverTimer};
pub use recorder::{MutationRecorder, RecorderState};
pub use replay::ReplayReport;
pub use snapshot::SnapshotStore;

/// Label reported before the first commit
pub const UNKNOWN_MENU: &str = "unknown";

/// Last confirmed session. Buffer and snapshots are only ever replaced
/// together.
#[derive(Debug, Clone, Default)]
pub struct CommittedState {
    pub buffer: Vec<MutationRecord>,
    pub snapshots: SnapshotStore,
    pub deltas: Deltas,
}

impl CommittedState {
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

pub struct MenuMonitor<T, B> {
    tree: T,
    bus: B,
    config: MonitorConfig,
    root: NodeId,
    baseline: Baseline,
    recorder: MutationRecorder,
    hover: HoverController,
    pending: Deltas,
    committed: CommittedState,
    menu_name: String,
}

impl<T: Tree, B: EventBus> MenuMonitor<T, B> {
    /// Attach to the root found by `locator`.
    ///
    /// Without a root the feature is disabled: the error is logged and no
    /// monitor is returned. Changes queued on the tree before attachment are
    /// discarded, matching an observer that starts watching now.
    pub fn attach<L: RootLocator>(
        mut tree: T,
        bus: B,
        config: MonitorConfig,
        locator: &L,
    ) -> Option<Self> {
        let Some(root) = locator.locate(&tree) else {
            tracing::error!("No header element found, menu monitor disabled");
            return None;
        };

        tree.take_records();
        let baseline = Baseline::capture(&tree, root, &config);
        tracing::info!(
            root = %root,
            hidden = baseline.hidden().len(),
            disclosures = baseline.disclosures().len(),
            hover_ms = config.hover_duration_ms,
            "Menu monitor attached"
        );

        Some(Self {
            hover: HoverController::new(config.hover_duration()),
            tree,
            bus,
            config,
            root,
            baseline,
            recorder: MutationRecorder::new(),
            pending: Deltas::default(),
            committed: CommittedState::default(),
            menu_name: UNKNOWN_MENU.to_string(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access for the host. Changes made here are queued by the tree
    /// and reach the recorder on the next [`sync`](Self::sync).
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn recorder(&self) -> &MutationRecorder {
        &self.recorder
    }

    pub fn committed(&self) -> &CommittedState {
        &self.committed
    }

    pub fn hover_target(&self) -> Option<NodeId> {
        self.hover.target()
    }

    /// When the armed hover timer will fire
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.hover.deadline()
    }

    /// Label of the last committed menu
    pub fn menu_name(&self) -> &str {
        &self.menu_name
    }

    pub fn into_parts(self) -> (T, B) {
        (self.tree, self.bus)
    }

    /// Feed one batch of tree changes to the recorder
    pub fn handle_mutations(&mut self, batch: Vec<MutationRecord>) {
        if batch.is_empty() {
            return;
        }
        self.recorder
            .process(&self.tree, self.root, &self.config.open_markers, batch);
    }

    /// Drain the tree's queued batch into the recorder
    pub fn sync(&mut self) {
        let batch = self.tree.take_records();
        self.handle_mutations(batch);
    }

    /// Pointer entered `node`. Ignored outside the root.
    pub fn pointer_enter(&mut self, node: NodeId, now: Instant) {
        if !self.tree.contains(self.root, node) {
            return;
        }
        self.hover.enter(node, now);
    }

    pub fn pointer_leave(&mut self) {
        self.hover.leave();
    }

    /// Fire the hover timer if it is due at `now`. Returns whether a commit
    /// happened.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        let Some(target) = self.hover.fire_if_due(now) else {
            return false;
        };
        self.commit(target);
        true
    }

    fn commit(&mut self, target: NodeId) {
        self.pending = Deltas::observe(&self.tree, &self.baseline);

        let label = self.tree.text_content(target);
        let label = label.trim();
        self.menu_name = if label.is_empty() {
            self.config.fallback_label.clone()
        } else {
            label.to_string()
        };
        tracing::info!(
            menu = %self.menu_name,
            session = self.recorder.session(),
            mutations = self.recorder.buffer().len(),
            "Capturing mutations now for {} menu",
            self.menu_name
        );

        self.publish(Topic::MenuOpen);

        self.committed = CommittedState {
            buffer: self.recorder.buffer().to_vec(),
            snapshots: self.recorder.snapshots().clone(),
            deltas: self.pending.clone(),
        };
        self.recorder.force_idle();
    }

    /// React to a consumed bus signal
    pub fn handle_signal(&mut self, signal: BusSignal) {
        match signal {
            BusSignal::ReopenMenu => {
                if let Some(target) = self.hover.target() {
                    tracing::debug!(hover_target = %target, "Pointer is hovering, replay skipped");
                    return;
                }
                self.replay();
            }
            BusSignal::CloseMenu => self.close(),
        }
    }

    pub fn reopen_menu(&mut self) {
        self.handle_signal(BusSignal::ReopenMenu);
    }

    pub fn close_menu(&mut self) {
        self.handle_signal(BusSignal::CloseMenu);
    }

    /// Strip open markers from every open node under the root, then close
    pub fn force_close(&mut self) {
        let stripped =
            close::strip_open_markers(&mut self.tree, self.root, &self.config.open_markers);
        tracing::debug!(stripped, "Forced open menus closed");
        self.close();
    }

    fn replay(&mut self) {
        let report = replay::replay_mutations(
            &mut self.tree,
            &self.committed.buffer,
            &self.committed.snapshots,
            &self.config.stable_id_attribute,
        );
        let deltas_applied = replay::apply_deltas(&mut self.tree, &self.committed.deltas);
        tracing::debug!(
            applied = report.applied,
            skipped = report.skipped,
            deltas_applied,
            "Replayed committed menu state"
        );

        if deltas_applied {
            self.publish(Topic::MenuCloseRequired);
        }
    }

    fn close(&mut self) {
        close::restore_baseline(&mut self.tree, &self.baseline);
        self.pending.clear();
        self.committed.deltas.clear();
        self.publish(Topic::HideCloseMenu);
    }

    fn publish(&mut self, topic: Topic) {
        tracing::debug!(topic = %topic, "Publishing menu event");
        self.bus
            .publish(MenuEvent::new(topic, self.recorder.buffer().to_vec()));
        self.recorder.force_idle();
    }
}

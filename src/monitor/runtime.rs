//! Live tokio driver for a [`MenuMonitor`]
//!
//! The monitor runs inside one task. Commands arrive over a channel, the
//! hover timer is a `sleep_until` branch of the select loop, and every
//! command is followed by delivery of the tree's queued mutation batch. An
//! overdue timer always fires before the next command is handled.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::bus::{BusSignal, EventBus};
use crate::tree::{NodeId, Tree};

use super::MenuMonitor;

type MonitorFn<T, B> = Box<dyn FnOnce(&mut MenuMonitor<T, B>) + Send>;

/// Commands to the monitor task
pub enum MonitorCommand<T, B> {
    /// Pointer entered a node
    PointerEnter(NodeId),
    /// Pointer left the root
    PointerLeave,
    /// A consumed bus signal
    Signal(BusSignal),
    /// Strip open markers and close
    ForceClose,
    /// Run a closure against the monitor (tree edits, inspection)
    With(MonitorFn<T, B>),
    /// Stop the task and hand the monitor back
    Shutdown,
}

/// Handle to control a spawned monitor
pub struct MonitorHandle<T, B> {
    cmd_tx: mpsc::UnboundedSender<MonitorCommand<T, B>>,
}

impl<T, B> Clone for MonitorHandle<T, B> {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
        }
    }
}

impl<T, B> MonitorHandle<T, B>
where
    T: Tree + Send + 'static,
    B: EventBus + Send + 'static,
{
    pub fn pointer_enter(&self, node: NodeId) {
        let _ = self.cmd_tx.send(MonitorCommand::PointerEnter(node));
    }

    pub fn pointer_leave(&self) {
        let _ = self.cmd_tx.send(MonitorCommand::PointerLeave);
    }

    pub fn reopen_menu(&self) {
        self.signal(BusSignal::ReopenMenu);
    }

    pub fn close_menu(&self) {
        self.signal(BusSignal::CloseMenu);
    }

    pub fn signal(&self, signal: BusSignal) {
        let _ = self.cmd_tx.send(MonitorCommand::Signal(signal));
    }

    pub fn force_close(&self) {
        let _ = self.cmd_tx.send(MonitorCommand::ForceClose);
    }

    /// Run `f` on the monitor task and return its result. `None` when the
    /// task has already stopped.
    pub async fn with<R, F>(&self, f: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut MenuMonitor<T, B>) -> R + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let command = MonitorCommand::With(Box::new(move |monitor| {
            let _ = tx.send(f(monitor));
        }));
        self.cmd_tx.send(command).ok()?;
        rx.await.ok()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(MonitorCommand::Shutdown);
    }
}

/// Spawn `monitor` on the current tokio runtime. The join handle yields the
/// monitor back after shutdown (or once every handle is dropped).
pub fn spawn_monitor<T, B>(
    monitor: MenuMonitor<T, B>,
) -> (MonitorHandle<T, B>, JoinHandle<MenuMonitor<T, B>>)
where
    T: Tree + Send + 'static,
    B: EventBus + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(monitor, cmd_rx));
    (MonitorHandle { cmd_tx }, task)
}

async fn run<T, B>(
    mut monitor: MenuMonitor<T, B>,
    mut cmd_rx: mpsc::UnboundedReceiver<MonitorCommand<T, B>>,
) -> MenuMonitor<T, B>
where
    T: Tree + Send + 'static,
    B: EventBus + Send + 'static,
{
    loop {
        let deadline = monitor.timer_deadline();
        // A disabled branch still needs a future; park it far away
        let sleep = tokio::time::sleep_until(
            deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400)),
        );

        tokio::select! {
            biased;

            _ = sleep, if deadline.is_some() => {
                monitor.poll_timer(Instant::now());
            }
            cmd = cmd_rx.recv() => {
                // A deadline that passed while the command was queued fires first
                monitor.poll_timer(Instant::now());
                match cmd {
                    None | Some(MonitorCommand::Shutdown) => break,
                    Some(MonitorCommand::PointerEnter(node)) => {
                        monitor.pointer_enter(node, Instant::now())
                    }
                    Some(MonitorCommand::PointerLeave) => monitor.pointer_leave(),
                    Some(MonitorCommand::Signal(signal)) => monitor.handle_signal(signal),
                    Some(MonitorCommand::ForceClose) => monitor.force_close(),
                    Some(MonitorCommand::With(f)) => f(&mut monitor),
                }
            }
        }

        monitor.sync();
    }

    tracing::debug!("Menu monitor task stopped");
    monitor
}

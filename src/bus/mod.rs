//! Event bus topics and publishers
//!
//! The monitor publishes through the [`EventBus`] trait so hosts can route
//! events anywhere (a channel, a log file, an in-memory list in tests).

mod log;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::tree::MutationRecord;

pub use log::{read_event_log, EventLogEntry, JsonlEventLog, EVENT_LOG_SCHEMA_VERSION};

/// Topics the monitor publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// Hover-confirmed commit completed
    MenuOpen,
    /// Replay restored state the closing detector cannot see
    MenuCloseRequired,
    /// Close handler finished teardown
    HideCloseMenu,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::MenuOpen => "menu-open",
            Topic::MenuCloseRequired => "menu-close-required",
            Topic::HideCloseMenu => "hide-close-menu",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals the monitor consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusSignal {
    /// Replay the committed state
    ReopenMenu,
    /// Tear down to the closed state
    CloseMenu,
}

impl BusSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusSignal::ReopenMenu => "reopen-menu",
            BusSignal::CloseMenu => "close-menu",
        }
    }
}

impl FromStr for BusSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reopen-menu" => Ok(BusSignal::ReopenMenu),
            "close-menu" => Ok(BusSignal::CloseMenu),
            other => Err(format!("unknown signal topic: {other}")),
        }
    }
}

/// A published event: topic plus the mutation list at publish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEvent {
    pub topic: Topic,
    pub mutations: Vec<MutationRecord>,
}

impl MenuEvent {
    pub fn new(topic: Topic, mutations: Vec<MutationRecord>) -> Self {
        Self { topic, mutations }
    }
}

/// Synchronous publish side of the bus
pub trait EventBus {
    fn publish(&mut self, event: MenuEvent);
}

impl<B: EventBus + ?Sized> EventBus for Box<B> {
    fn publish(&mut self, event: MenuEvent) {
        (**self).publish(event);
    }
}

impl<B: EventBus> EventBus for Option<B> {
    fn publish(&mut self, event: MenuEvent) {
        if let Some(bus) = self {
            bus.publish(event);
        }
    }
}

/// Fan out to two buses, first one first
impl<A: EventBus, B: EventBus> EventBus for (A, B) {
    fn publish(&mut self, event: MenuEvent) {
        self.0.publish(event.clone());
        self.1.publish(event);
    }
}

/// Keeps every published event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    events: Vec<MenuEvent>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MenuEvent] {
        &self.events
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.events.iter().map(|e| e.topic).collect()
    }

    pub fn count(&self, topic: Topic) -> usize {
        self.events.iter().filter(|e| e.topic == topic).count()
    }

    pub fn last(&self, topic: Topic) -> Option<&MenuEvent> {
        self.events.iter().rev().find(|e| e.topic == topic)
    }
}

impl EventBus for RecordingBus {
    fn publish(&mut self, event: MenuEvent) {
        self.events.push(event);
    }
}

/// Forwards events over an unbounded tokio channel. A dropped receiver is
/// not an error; events are simply discarded.
#[derive(Debug, Clone)]
pub struct ChannelBus {
    tx: mpsc::UnboundedSender<MenuEvent>,
}

impl ChannelBus {
    pub fn new(tx: mpsc::UnboundedSender<MenuEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MenuEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventBus for ChannelBus {
    fn publish(&mut self, event: MenuEvent) {
        let _ = self.tx.send(event);
    }
}

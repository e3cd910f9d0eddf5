pub mod bus;
pub mod config;
pub mod monitor;
pub mod scenario;
pub mod tree;
pub mod util;

pub use bus::{
    BusSignal, ChannelBus, EventBus, EventLogEntry, JsonlEventLog, MenuEvent, RecordingBus, Topic,
};
pub use config::MonitorConfig;
pub use monitor::runtime::{spawn_monitor, MonitorCommand, MonitorHandle};
pub use monitor::{CommittedState, MenuMonitor};
pub use scenario::{Scenario, ScenarioError, Step};
pub use tree::{
    Document, HeaderRootLocator, MutationKind, MutationRecord, NodeId, NodeRef, NodeSnapshot,
    RootLocator, Tree,
};

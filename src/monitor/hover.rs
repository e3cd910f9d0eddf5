//! Debounced hover trigger

use std::time::Duration;

use tokio::time::Instant;

use crate::tree::NodeId;

/// Single cancellable deadline. Arming replaces any previous deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverTimer {
    deadline: Option<Instant>,
}

impl HoverTimer {
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.deadline = Some(now + duration);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and report `true` when the deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Tracks the hovered node and gates commits on an uninterrupted hover
#[derive(Debug, Clone)]
pub struct HoverController {
    target: Option<NodeId>,
    timer: HoverTimer,
    duration: Duration,
}

impl HoverController {
    pub fn new(duration: Duration) -> Self {
        Self {
            target: None,
            timer: HoverTimer::default(),
            duration,
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Pointer entered `node`; last hover wins
    pub fn enter(&mut self, node: NodeId, now: Instant) {
        self.target = Some(node);
        self.timer.cancel();
        self.timer.arm(now, self.duration);
    }

    pub fn leave(&mut self) {
        self.timer.cancel();
        self.target = None;
    }

    /// The hovered node when the timer fires at `now`
    pub fn fire_if_due(&mut self, now: Instant) -> Option<NodeId> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        self.target
    }
}

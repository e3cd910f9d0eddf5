//! Shared test utilities for menu-monitor
//!
//! - A header fixture with a nav menu, a hidden submenu and a disclosure
//! - Scenario JSON used by the CLI tests

pub mod fixtures;

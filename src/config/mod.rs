mod settings;

pub use settings::{MonitorConfig, TomlConfig, TomlMonitorConfig, EXAMPLE_CONFIG};

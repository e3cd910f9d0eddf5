use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::paths::config_path;

/// Example configuration file contents, written on first run
pub const EXAMPLE_CONFIG: &str = r#"# menu-monitor configuration
#
# Every key is optional; missing keys keep their defaults.

[monitor]
# How long the pointer must rest inside the header before a menu is committed
# hover_duration_ms = 3000

# Class names that mark a menu as open
# open_markers = ["is-active", "is-expanded"]

# Attribute used to match nodes between snapshots and the live tree
# stable_id_attribute = "data-node-id"

# Element whose hidden descendants are tracked for incidental reveal
# menu_container_tag = "nav"

# Disclosure elements tracked for incidental opening
# disclosure_tag = "details"

# Menu label used when the hovered node has no text
# fallback_label = "selected"
"#;

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorConfig {
    /// Hover time before a recording is committed, in milliseconds
    pub hover_duration_ms: u64,
    /// Class names whose presence means "menu open"
    pub open_markers: Vec<String>,
    /// Attribute carrying a node's stable id
    pub stable_id_attribute: String,
    /// Tag of the container whose hidden descendants are tracked
    pub menu_container_tag: String,
    /// Tag of disclosure elements
    pub disclosure_tag: String,
    /// Label used when the hover target has no text
    pub fallback_label: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hover_duration_ms: 3000,
            open_markers: vec!["is-active".into(), "is-expanded".into()],
            stable_id_attribute: "data-node-id".into(),
            menu_container_tag: "nav".into(),
            disclosure_tag: "details".into(),
            fallback_label: "selected".into(),
        }
    }
}

/// TOML representation of the `[monitor]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlMonitorConfig {
    pub hover_duration_ms: Option<u64>,
    pub open_markers: Option<Vec<String>>,
    pub stable_id_attribute: Option<String>,
    pub menu_container_tag: Option<String>,
    pub disclosure_tag: Option<String>,
    pub fallback_label: Option<String>,
}

/// TOML file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub monitor: Option<TomlMonitorConfig>,
}

impl MonitorConfig {
    /// Load configuration from the default config file, merging with defaults.
    /// Writes the example file on first run.
    pub fn load() -> Self {
        let config_file = config_path();

        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from `path`, merging with defaults. A missing or
    /// unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = MonitorConfig::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "No config file, using defaults"
                );
                return config;
            }
        };

        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => {
                if let Some(monitor) = toml_config.monitor {
                    config.merge(monitor);
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid config file, using defaults"
                );
            }
        }

        config
    }

    /// Apply every key present in `overrides`
    pub fn merge(&mut self, overrides: TomlMonitorConfig) {
        if let Some(ms) = overrides.hover_duration_ms {
            self.hover_duration_ms = ms;
        }
        if let Some(markers) = overrides.open_markers {
            self.open_markers = markers;
        }
        if let Some(attribute) = overrides.stable_id_attribute {
            self.stable_id_attribute = attribute;
        }
        if let Some(tag) = overrides.menu_container_tag {
            self.menu_container_tag = tag;
        }
        if let Some(tag) = overrides.disclosure_tag {
            self.disclosure_tag = tag;
        }
        if let Some(label) = overrides.fallback_label {
            self.fallback_label = label;
        }
    }

    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn hover_duration(&self) -> Duration {
        Duration::from_millis(self.hover_duration_ms)
    }

    pub fn with_hover_duration(mut self, duration: Duration) -> Self {
        self.hover_duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_open_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.open_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Render the effective configuration as a `[monitor]` TOML table
    pub fn to_toml(&self) -> String {
        #[derive(Serialize)]
        struct Wrapper<'a> {
            monitor: &'a MonitorConfig,
        }
        toml::to_string_pretty(&Wrapper { monitor: self }).unwrap_or_default()
    }
}

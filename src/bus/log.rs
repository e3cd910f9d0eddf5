use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{EventBus, MenuEvent};

pub const EVENT_LOG_SCHEMA_VERSION: u32 = 1;

/// One published event as written to the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventLogEntry {
    pub seq: u64,
    pub ts_ms: u64,
    pub event: MenuEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventLogLine {
    Header {
        schema_version: u32,
        created_at_ms: u64,
    },
    Entry {
        entry: EventLogEntry,
    },
}

/// Append-only JSONL trace of published events.
///
/// The first line is a header; every publish appends one entry line and
/// flushes. Write failures are logged and dropped so a full disk never
/// breaks the monitor.
pub struct JsonlEventLog {
    seq: AtomicU64,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlEventLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let header = EventLogLine::Header {
            schema_version: EVENT_LOG_SCHEMA_VERSION,
            created_at_ms: now_ms(),
        };
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&header).map_err(io::Error::other)?
        )?;
        writer.flush()?;
        Ok(Self {
            seq: AtomicU64::new(1),
            writer: Mutex::new(writer),
        })
    }

    pub fn append(&self, event: MenuEvent) -> io::Result<()> {
        let line = EventLogLine::Entry {
            entry: EventLogEntry {
                seq: self.seq.fetch_add(1, Ordering::SeqCst),
                ts_ms: now_ms(),
                event,
            },
        };
        let json = serde_json::to_string(&line).map_err(io::Error::other)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}

impl EventBus for JsonlEventLog {
    fn publish(&mut self, event: MenuEvent) {
        let topic = event.topic;
        if let Err(e) = self.append(event) {
            tracing::warn!(topic = %topic, error = %e, "Failed to write event log entry");
        }
    }
}

/// Read every entry of an event log, validating the header
pub fn read_event_log(path: &Path) -> io::Result<Vec<EventLogEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut saw_header = false;
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: EventLogLine =
            serde_json::from_str(&line).map_err(|e| io::Error::other(format!("{e}")))?;
        match parsed {
            EventLogLine::Header { schema_version, .. } => {
                if idx != 0 {
                    return Err(io::Error::other("event log header must be the first line"));
                }
                if schema_version != EVENT_LOG_SCHEMA_VERSION {
                    return Err(io::Error::other(format!(
                        "unsupported event log schema version {schema_version}"
                    )));
                }
                saw_header = true;
            }
            EventLogLine::Entry { entry } => entries.push(entry),
        }
    }

    if !saw_header {
        return Err(io::Error::other("missing event log header"));
    }
    Ok(entries)
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

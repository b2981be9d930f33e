//! In-memory log capture for the terminal log panel.
//!
//! `tracing` output is formatted compactly and parsed back into
//! [`LogEntry`] values held in a bounded ring buffer.

use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level,
            target: target.to_string(),
            message,
        }
    }

    /// Format for the log panel
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {:<5} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }

    /// Parse one compact-format line: "LEVEL target: message"
    fn parse(line: &str) -> Self {
        let levels = [
            ("TRACE ", Level::TRACE),
            ("DEBUG ", Level::DEBUG),
            ("INFO ", Level::INFO),
            ("WARN ", Level::WARN),
            ("ERROR ", Level::ERROR),
        ];
        let Some((level, rest)) = levels
            .iter()
            .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest)))
        else {
            return Self::new(Level::INFO, "general", line.to_string());
        };

        match rest.split_once(':') {
            Some((target, msg)) if !target.contains(' ') => {
                Self::new(level, target, msg.trim().to_string())
            }
            _ => Self::new(level, "general", rest.trim().to_string()),
        }
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock leaves the deque itself intact
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The newest `count` entries, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Writer handed to the fmt layer; every write becomes a log entry
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self { buffer }
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf) {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                self.buffer.push(LogEntry::parse(line));
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// The process-wide log buffer, created on first use
pub fn get_log_buffer() -> LogRingBuffer {
    LOG_BUFFER.get_or_init(LogRingBuffer::new).clone()
}

/// Install the tracing subscriber that feeds the ring buffer.
/// Safe to call more than once; later calls only return the buffer.
pub fn init_tracing() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = get_log_buffer();

    let fmt_layer = fmt::layer()
        .with_writer(RingBufferWriter::new(buffer.clone()))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(target: "system", "Tracing initialized");
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_line() {
        let entry = LogEntry::parse("WARN edit: Rolled back EditId(1)");
        assert_eq!(entry.level, Level::WARN);
        assert_eq!(entry.target, "edit");
        assert_eq!(entry.message, "Rolled back EditId(1)");

        let plain = LogEntry::parse("no level here");
        assert_eq!(plain.target, "general");
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let buffer = LogRingBuffer::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            buffer.push(LogEntry::new(Level::INFO, "test", i.to_string()));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);
        let recent = buffer.get_recent(2);
        assert_eq!(recent[1].message, (MAX_LOG_ENTRIES + 4).to_string());
        assert_eq!(recent[0].message, (MAX_LOG_ENTRIES + 3).to_string());
    }
}

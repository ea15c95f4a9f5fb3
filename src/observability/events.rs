//! Structured event stream for `typewriter`.
//!
//! Discrete, typed events emitted while engines run. Events are serialized
//! as newline-delimited JSON (JSONL) and carry a monotonically increasing
//! sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a run.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A run has started its engines.
    RunStarted {
        /// When the run started.
        timestamp: DateTime<Utc>,
        /// Unique id of this run.
        run_id: Uuid,
        /// Number of displays configured.
        displays: usize,
    },

    /// A display was configured but its engine did not start.
    EngineSkipped {
        /// When the display was skipped.
        timestamp: DateTime<Utc>,
        /// Display name.
        display: String,
        /// Why the engine did not start.
        reason: String,
    },

    /// An engine began ticking.
    EngineStarted {
        /// When the engine started.
        timestamp: DateTime<Utc>,
        /// Display name.
        display: String,
        /// Number of phrases in the cycle.
        phrase_count: usize,
    },

    /// A phrase is fully typed and on hold.
    PhraseCompleted {
        /// When the last character was rendered.
        timestamp: DateTime<Utc>,
        /// Display name.
        display: String,
        /// Index of the phrase.
        phrase_index: usize,
        /// The phrase text.
        phrase: String,
    },

    /// A phrase was fully deleted and the engine moved on.
    PhraseAdvanced {
        /// When the display became empty.
        timestamp: DateTime<Utc>,
        /// Display name.
        display: String,
        /// Phrase just deleted.
        from: usize,
        /// Phrase typed next.
        to: usize,
    },

    /// An engine stopped.
    EngineStopped {
        /// When the engine stopped.
        timestamp: DateTime<Utc>,
        /// Display name.
        display: String,
        /// Ticks performed.
        ticks: u64,
        /// Completed type-delete cycles.
        cycles: u64,
        /// Human-readable stop reason.
        reason: String,
    },

    /// The run ended.
    RunStopped {
        /// When the run ended.
        timestamp: DateTime<Utc>,
        /// Unique id of this run.
        run_id: Uuid,
        /// Human-readable stop reason.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) atomically increments the sequence
/// counter, serializes the event as a single JSON line, and flushes the
/// underlying writer. Serialization or I/O failures are dropped: a broken
/// event sink must never stop an animation.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug — provide a manual impl.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Creates an emitter backed by a shared in-memory buffer.
    #[must_use]
    pub fn in_memory() -> (Self, EventBuffer) {
        let buffer = EventBuffer::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

/// Shared in-memory sink for emitted events.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer(Arc<Mutex<Vec<u8>>>);

impl EventBuffer {
    /// Raw JSONL contents.
    #[must_use]
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    /// Parsed event lines; unparseable lines are skipped.
    #[must_use]
    pub fn lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }
}

impl Write for EventBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("event buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event::EngineStarted {
            timestamp: DateTime::parse_from_rfc3339("2026-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            display: "hero".to_owned(),
            phrase_count: 4,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "EngineStarted");
        assert_eq!(parsed["display"], "hero");
        assert_eq!(parsed["phrase_count"], 4);
    }

    #[test]
    fn emitter_increments_sequence() {
        let (emitter, buffer) = EventEmitter::in_memory();
        emitter.emit(sample_event());
        emitter.emit(Event::EngineStopped {
            timestamp: Utc::now(),
            display: "hero".to_owned(),
            ticks: 12,
            cycles: 1,
            reason: "cancelled".to_owned(),
        });

        assert_eq!(emitter.event_count(), 2);

        let lines = buffer.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "cancelled");
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "EngineStarted");
        assert!(
            parsed.get("event").is_none(),
            "event field should be flattened"
        );
    }

    #[test]
    fn run_events_carry_run_id() {
        let (emitter, buffer) = EventEmitter::in_memory();
        let run_id = Uuid::new_v4();
        emitter.emit(Event::RunStarted {
            timestamp: Utc::now(),
            run_id,
            displays: 2,
        });
        let lines = buffer.lines();
        assert_eq!(lines[0]["run_id"], run_id.to_string());
    }

    #[test]
    fn noop_emitter_counts_but_discards() {
        let emitter = EventEmitter::noop();
        emitter.emit(sample_event());
        assert_eq!(emitter.event_count(), 1);
    }
}

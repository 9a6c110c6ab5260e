//! Compliance logging
//!
//! Every classified item produces one [`ComplianceEvent`] that is offered
//! once to each configured sink. Emission is fire-and-forget: sinks report
//! their own failures through `tracing` and nothing flows back to the
//! classification path.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use msh_common::events::{ComplianceBus, ComplianceEvent, SubjectKind};

use crate::model::{ClassificationResult, Playlist, Track};

/// Destination for compliance log entries
pub trait ComplianceSink: Send + Sync {
    /// Short identifier used in diagnostics
    fn name(&self) -> &'static str;

    /// Deliver one entry. Must not block and must not fail the caller.
    fn emit(&self, entry: &ComplianceEvent);
}

/// Writes entries as structured events on the `compliance` tracing target
#[derive(Debug, Default)]
pub struct TracingSink;

impl ComplianceSink for TracingSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn emit(&self, entry: &ComplianceEvent) {
        info!(
            target: "compliance",
            entry_id = %entry.entry_id,
            timestamp = %msh_common::time::to_iso8601(&entry.timestamp),
            subject_kind = ?entry.subject_kind,
            subject_id = %entry.subject_id,
            subject_name = %entry.subject_name,
            artist = entry.artist.as_deref().unwrap_or(""),
            track_count = ?entry.track_count,
            explicit = entry.is_explicit,
            educational_value = entry.educational_value,
            risk_level = %entry.risk_level,
            admitted = entry.admitted,
            user_consent = entry.user_consent,
            educational_context = %entry.educational_context,
            notes = %entry.compliance_notes,
            "Content access logged"
        );
    }
}

/// Publishes entries to live subscribers of a [`ComplianceBus`]
pub struct BroadcastSink {
    bus: Arc<ComplianceBus>,
}

impl BroadcastSink {
    pub fn new(bus: Arc<ComplianceBus>) -> Self {
        Self { bus }
    }
}

impl ComplianceSink for BroadcastSink {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn emit(&self, entry: &ComplianceEvent) {
        // No subscribers is normal
        self.bus.emit_lossy(entry.clone());
    }
}

/// Appends one JSON object per line to a file
///
/// `emit` only encodes the entry and queues it; a background task owns the
/// file and does the writing, so request handlers never wait on disk I/O.
pub struct JsonLinesSink {
    tx: mpsc::UnboundedSender<String>,
}

impl JsonLinesSink {
    /// Open (or create) the log file in append mode and start its writer task
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(path: &Path) -> msh_common::Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            msh_common::Error::Internal(format!(
                "Compliance log {} requires a tokio runtime",
                path.display()
            ))
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(write_lines(path.to_path_buf(), tokio::fs::File::from_std(file), rx));
        Ok(Self { tx })
    }
}

impl ComplianceSink for JsonLinesSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn emit(&self, entry: &ComplianceEvent) {
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode compliance entry {}: {}", entry.entry_id, e);
                return;
            }
        };

        if self.tx.send(line).is_err() {
            warn!("Compliance log writer stopped; entry {} dropped", entry.entry_id);
        }
    }
}

/// Writer task: drains queued lines into the file until every sender is gone
async fn write_lines(path: PathBuf, file: tokio::fs::File, mut rx: mpsc::UnboundedReceiver<String>) {
    let mut writer = BufWriter::new(file);
    while let Some(line) = rx.recv().await {
        if let Err(e) = append_line(&mut writer, &line).await {
            warn!(
                "Failed to append compliance entry to {}: {}",
                path.display(),
                e
            );
        }
    }
    debug!("Compliance log writer for {} finished", path.display());
}

async fn append_line(writer: &mut BufWriter<tokio::fs::File>, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Identity of the classified item as recorded on its entry
struct Subject<'a> {
    kind: SubjectKind,
    id: &'a str,
    name: &'a str,
    artist: Option<String>,
    track_count: Option<u32>,
}

/// Builds compliance entries and fans them out to sinks
#[derive(Clone)]
pub struct ComplianceLogger {
    sinks: Vec<Arc<dyn ComplianceSink>>,
    educational_context: String,
    enabled: bool,
}

impl ComplianceLogger {
    pub fn new(educational_context: impl Into<String>) -> Self {
        Self {
            sinks: Vec::new(),
            educational_context: educational_context.into(),
            enabled: true,
        }
    }

    /// Logger that records nothing
    pub fn disabled() -> Self {
        Self {
            sinks: Vec::new(),
            educational_context: String::new(),
            enabled: false,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ComplianceSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Record a track classification
    ///
    /// Returns the emitted entry, or `None` when logging is disabled.
    pub fn log_track(
        &self,
        track: &Track,
        result: &ClassificationResult,
        user_info: Option<&Value>,
    ) -> Option<ComplianceEvent> {
        let artist = match track.primary_artist() {
            "" => None,
            name => Some(name.to_string()),
        };
        let subject = Subject {
            kind: SubjectKind::Track,
            id: track.id(),
            name: track.name(),
            artist,
            track_count: None,
        };
        self.record(subject, result, user_info)
    }

    /// Record a playlist classification
    pub fn log_playlist(
        &self,
        playlist: &Playlist,
        result: &ClassificationResult,
        user_info: Option<&Value>,
    ) -> Option<ComplianceEvent> {
        let subject = Subject {
            kind: SubjectKind::Playlist,
            id: playlist.id(),
            name: playlist.name(),
            artist: None,
            track_count: Some(playlist.track_count()),
        };
        self.record(subject, result, user_info)
    }

    fn record(
        &self,
        subject: Subject<'_>,
        result: &ClassificationResult,
        user_info: Option<&Value>,
    ) -> Option<ComplianceEvent> {
        if !self.enabled {
            return None;
        }

        let entry = ComplianceEvent {
            entry_id: Uuid::new_v4(),
            timestamp: msh_common::time::now(),
            subject_kind: subject.kind,
            subject_id: subject.id.to_string(),
            subject_name: subject.name.to_string(),
            artist: subject.artist,
            track_count: subject.track_count,
            is_explicit: result.is_explicit,
            educational_value: result.educational_value,
            risk_level: result.risk_level,
            admitted: result.admitted,
            user_consent: true,
            educational_context: self.educational_context.clone(),
            compliance_notes: result.notes(),
            user_info: user_info.cloned(),
        };

        for sink in &self.sinks {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| sink.emit(&entry)));
            if delivered.is_err() {
                warn!(
                    "Compliance sink '{}' panicked on entry {}; continuing",
                    sink.name(),
                    entry.entry_id
                );
            }
        }

        Some(entry)
    }
}

//! Compliance event types and broadcast bus
//!
//! Every classification decision made by a Music Study Hub service is
//! described by a [`ComplianceEvent`]. Events are created once, never
//! mutated, and handed to whichever sinks the service has configured; the
//! [`ComplianceBus`] is the in-process sink that fans them out to live
//! subscribers such as the SSE endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Coarse, informational description of explicit-content exposure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of catalog item a compliance event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Track,
    Playlist,
}

/// One compliance log entry
///
/// Snapshot of a single classification decision plus the compliance
/// annotation required by the institution's content-safety policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceEvent {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub subject_name: String,
    /// Primary artist for tracks; `None` for playlists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Number of tracks for playlists; `None` for tracks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_count: Option<u32>,
    pub is_explicit: bool,
    pub educational_value: u32,
    pub risk_level: RiskLevel,
    pub admitted: bool,
    /// Access through the study platform implies consent
    pub user_consent: bool,
    pub educational_context: String,
    /// Classification reasons joined with `"; "`
    pub compliance_notes: String,
    /// Opaque caller-supplied user context, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Value>,
}

/// Broadcast bus for compliance events
///
/// Thin wrapper over a tokio broadcast channel. Sending never blocks;
/// slow subscribers lag and lose the oldest events rather than applying
/// back-pressure to request handlers.
pub struct ComplianceBus {
    tx: broadcast::Sender<ComplianceEvent>,
}

impl ComplianceBus {
    /// Creates a new bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ComplianceEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ComplianceEvent) {
        let _ = self.tx.send(event);
    }
}

//! Session Event Logger
//!
//! Structured session events (utterance, evaluation, error) emitted on the
//! `session_events` target so they land in the NDJSON log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Utterance {
        turn: u32,
        speaker: String,
        content: String,
    },
    Evaluation {
        total_score: u8,
        values_score: u8,
        verdict: String,
    },
    Error {
        error_msg: String,
    },
}

impl SessionEvent {
    /// Scrub secrets from every free-text field.
    fn redacted(mut self) -> Self {
        match &mut self {
            SessionEvent::Utterance { content, .. } => {
                *content = redact_sensitive_data(content);
            }
            SessionEvent::Evaluation { verdict, .. } => {
                *verdict = redact_sensitive_data(verdict);
            }
            SessionEvent::Error { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

impl EventLogEntry {
    pub fn new(session_id: &str, event: SessionEvent) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one session event.
    pub fn log_event(session_id: &str, event: SessionEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "session_events", session_id = %entry.session_id, event = %json, "Session event");
    }
}

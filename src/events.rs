// Tunegrab - Playlist-aware music downloader
// Copyright (C) 2026 Tunegrab contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Named event emission toward the hosting UI layer
//!
//! The core never talks to a UI directly; it emits named events with a JSON
//! payload through an [`EventSink`] and forgets about them. Two event names
//! make up the wire contract:
//!
//! - `log_event` — human-readable string payload, one line per lifecycle
//!   transition or error
//! - `download_progress` — `{"song": <track>, "percent": <0..100>}`

use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Event name for human-readable log lines
pub const LOG_EVENT: &str = "log_event";

/// Event name for download progress updates
pub const PROGRESS_EVENT: &str = "download_progress";

/// Fire-and-forget sink for named events with a JSON payload
///
/// Implementations must tolerate being called from concurrent tasks; no
/// acknowledgment is ever delivered back to the emitter.
pub trait EventSink: Send + Sync {
    fn emit(&self, name: &str, payload: Value);

    /// Convenience wrapper emitting a `log_event` line
    fn log(&self, message: &str) {
        self.emit(LOG_EVENT, json!(message));
    }
}

/// Sink that routes events into the tracing log, for headless use
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, name: &str, payload: Value) {
        tracing::info!(event = name, %payload, "event");
    }
}

/// One captured event: name plus payload
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub payload: Value,
}

/// Sink forwarding events into an unbounded channel
///
/// This is what a UI bridge subscribes to; tests use it to assert on the
/// emitted sequence. A closed receiver drops events silently, preserving
/// fire-and-forget semantics.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, name: &str, payload: Value) {
        let _ = self.tx.send(Event {
            name: name.to_string(),
            payload,
        });
    }
}

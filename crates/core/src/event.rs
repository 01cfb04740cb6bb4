// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Watch events for streaming change notifications.
//!
//! The control plane streams one JSON object per line on a watch connection.
//! Each object carries the change type and the full resource record:
//!
//! ```text
//! {"type": "ADDED", "object": {"kind": "Pod", "metadata": {...}}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// The kind of change a watch event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchEventType {
    /// A resource was created.
    Added,
    /// A resource was mutated.
    Modified,
    /// A resource was deleted.
    Deleted,
    /// The server (or the client's decoder) reported a failure.
    Error,
    /// A resource-version checkpoint with no resource change.
    Bookmark,
}

/// One change notification from a watch stream.
///
/// The `object` is an opaque structured record; re-hydrating it into a typed
/// resource is the resource-kind layer's job, not this crate's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEvent {
    /// The change type.
    #[serde(rename = "type")]
    pub event_type: WatchEventType,
    /// The full resource record at the time of the change.
    pub object: Value,
}

impl WatchEvent {
    /// Parses one newline-delimited watch line into an event.
    pub fn parse_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Builds a synthetic `Error` event for a line that failed to decode.
    ///
    /// A malformed line must not abort the stream and must not be dropped
    /// silently, so the failure is surfaced through the event stream itself
    /// as a status-shaped record.
    pub fn decode_failure(line: &str, err: &crate::Error) -> Self {
        WatchEvent {
            event_type: WatchEventType::Error,
            object: json!({
                "kind": "Status",
                "status": "Failure",
                "reason": "DecodeError",
                "message": err.to_string(),
                "details": { "line": line },
            }),
        }
    }

    /// Returns the object's resource version, if present.
    ///
    /// Absent on synthetic `Error` events and server status objects.
    pub fn resource_version(&self) -> Option<&str> {
        self.object.get("metadata")?.get("resourceVersion")?.as_str()
    }

    /// Whether this is an `Error` event.
    pub fn is_error(&self) -> bool {
        self.event_type == WatchEventType::Error
    }
}

/// Handler verdict after each dispatched watch event.
///
/// Replaces the loosely-typed "truthy return stops the watch" convention
/// with an explicit three-state signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchFlow {
    /// Keep watching.
    Continue,
    /// Stop watching; the caller got what it wanted.
    Done,
    /// Stop watching and report the call as failed.
    Abort,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

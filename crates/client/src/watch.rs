// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Watch engine: long-lived change-notification streams.
//!
//! A watch call opens one streaming GET with `watch=true`, decodes one JSON
//! event per line, and dispatches each event synchronously to the caller's
//! handler. Dispatch happens on the calling task with no buffering beyond the
//! current event, so ordering is strict and a slow handler back-pressures the
//! stream.

use std::time::Duration;

use caravel_core::{WatchEvent, WatchFlow};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::{Client, ClientError};
use crate::transport::Transport;

/// Recognized query options for a watch call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Bounds the connection lifetime, enforced on both ends.
    pub timeout_seconds: Option<u64>,
    /// Resource version to start watching from (resume point).
    pub resource_version: Option<String>,
    /// Server-side label filter.
    pub label_selector: Option<String>,
    /// Server-side field filter.
    pub field_selector: Option<String>,
}

impl WatchOptions {
    /// Renders the options as a `watch=true&...` query string.
    pub fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("watch", "true");
        if let Some(timeout) = self.timeout_seconds {
            query.append_pair("timeoutSeconds", &timeout.to_string());
        }
        if let Some(version) = &self.resource_version {
            query.append_pair("resourceVersion", version);
        }
        if let Some(selector) = &self.label_selector {
            query.append_pair("labelSelector", selector);
        }
        if let Some(selector) = &self.field_selector {
            query.append_pair("fieldSelector", selector);
        }
        query.finish()
    }
}

/// How a watch call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The handler signaled `Done`.
    Completed,
    /// The server closed the stream before the handler was done.
    Ended,
    /// `timeout_seconds` elapsed before the handler was done.
    TimedOut,
}

impl WatchOutcome {
    /// Whether the handler got what it was watching for.
    pub fn is_completed(self) -> bool {
        self == WatchOutcome::Completed
    }
}

impl<T: Transport> Client<T> {
    /// Watches a resource collection.
    ///
    /// The handler is invoked once per decoded event, in server emission
    /// order, until it returns [`WatchFlow::Done`] or [`WatchFlow::Abort`],
    /// the stream ends, or the configured timeout elapses.
    pub async fn watch_collection<F>(
        &self,
        path: &str,
        options: &WatchOptions,
        handler: F,
    ) -> Result<WatchOutcome, ClientError>
    where
        F: FnMut(WatchEvent) -> WatchFlow,
    {
        let target = format!("{}?{}", path.trim_end_matches('/'), options.query_string());
        self.run_watch(&target, options, handler).await
    }

    /// Watches a single named resource within a collection.
    pub async fn watch_single<F>(
        &self,
        path: &str,
        name: &str,
        options: &WatchOptions,
        handler: F,
    ) -> Result<WatchOutcome, ClientError>
    where
        F: FnMut(WatchEvent) -> WatchFlow,
    {
        let target = format!(
            "{}/{}?{}",
            path.trim_end_matches('/'),
            name,
            options.query_string()
        );
        self.run_watch(&target, options, handler).await
    }

    async fn run_watch<F>(
        &self,
        target: &str,
        options: &WatchOptions,
        mut handler: F,
    ) -> Result<WatchOutcome, ClientError>
    where
        F: FnMut(WatchEvent) -> WatchFlow,
    {
        let mut stream = self.transport.open_stream(target).await?;
        let deadline = options
            .timeout_seconds
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        // Latest resource version seen on this call, the resume cursor for a
        // follow-up watch. Owned by this call; never persisted.
        let mut last_version: Option<String> = None;

        loop {
            let line = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, stream.next_line()).await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        debug!("watch timed out, cursor at {:?}", last_version);
                        return Ok(WatchOutcome::TimedOut);
                    }
                },
                None => stream.next_line().await?,
            };

            let Some(line) = line else {
                debug!("watch stream ended, cursor at {:?}", last_version);
                return Ok(WatchOutcome::Ended);
            };
            if line.trim().is_empty() {
                continue;
            }

            // Every non-blank line produces exactly one handler invocation:
            // a malformed line becomes a synthetic ERROR event.
            let event = match WatchEvent::parse_line(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!("undecodable watch line: {}", e);
                    WatchEvent::decode_failure(&line, &e)
                }
            };

            if let Some(version) = event.resource_version() {
                last_version = Some(version.to_string());
            }

            match handler(event) {
                WatchFlow::Continue => {}
                WatchFlow::Done => return Ok(WatchOutcome::Completed),
                WatchFlow::Abort => return Err(ClientError::Aborted),
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared mock transport for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::transport::{FrameSocket, LineStream, Transport, TransportResult};

/// A unary request recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

/// Mock transport scripted from the outside.
///
/// Lines and frames queued before the call are replayed in order; when a
/// script runs dry the stream either ends cleanly or stalls (for timeout
/// tests), depending on `stall_when_empty`.
pub struct MockTransport {
    lines: Arc<Mutex<VecDeque<TransportResult<Option<String>>>>>,
    frames: Arc<Mutex<VecDeque<TransportResult<Option<Vec<u8>>>>>>,
    pub sent_frames: Arc<Mutex<Vec<Vec<u8>>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub opened_paths: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<Mutex<bool>>,
    timeout: Duration,
    stall_when_empty: bool,
    response_body: String,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            lines: Arc::new(Mutex::new(VecDeque::new())),
            frames: Arc::new(Mutex::new(VecDeque::new())),
            sent_frames: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            opened_paths: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            timeout: Duration::from_secs(30),
            stall_when_empty: false,
            response_body: String::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stall instead of ending the stream when the script runs dry.
    pub fn stalling(mut self) -> Self {
        self.stall_when_empty = true;
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    pub fn queue_line(&self, line: impl Into<String>) {
        self.lines.lock().unwrap().push_back(Ok(Some(line.into())));
    }

    pub fn queue_line_result(&self, result: TransportResult<Option<String>>) {
        self.lines.lock().unwrap().push_back(result);
    }

    pub fn remaining_lines(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn queue_frame(&self, frame: Vec<u8>) {
        self.frames.lock().unwrap().push_back(Ok(Some(frame)));
    }

    pub fn queue_frame_result(&self, result: TransportResult<Option<Vec<u8>>>) {
        self.frames.lock().unwrap().push_back(result);
    }

    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.sent_frames.lock().unwrap().clone()
    }

    pub fn opened_paths(&self) -> Vec<String> {
        self.opened_paths.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<String>> + Send + '_>> {
        let record = RecordedRequest {
            method: method.to_string(),
            path: path_and_query.to_string(),
            body,
            content_type: content_type.map(str::to_string),
        };
        Box::pin(async move {
            self.requests.lock().unwrap().push(record);
            Ok(self.response_body.clone())
        })
    }

    fn open_stream(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn LineStream>>> + Send + '_>> {
        let path = path_and_query.to_string();
        Box::pin(async move {
            self.opened_paths.lock().unwrap().push(path);
            Ok(Box::new(MockLineStream {
                script: Arc::clone(&self.lines),
                stall_when_empty: self.stall_when_empty,
            }) as Box<dyn LineStream>)
        })
    }

    fn open_channels(
        &self,
        path_and_query: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Box<dyn FrameSocket>>> + Send + '_>> {
        let path = path_and_query.to_string();
        Box::pin(async move {
            self.opened_paths.lock().unwrap().push(path);
            Ok(Box::new(MockFrameSocket {
                incoming: Arc::clone(&self.frames),
                outgoing: Arc::clone(&self.sent_frames),
                closed: Arc::clone(&self.closed),
                stall_when_empty: self.stall_when_empty,
            }) as Box<dyn FrameSocket>)
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

struct MockLineStream {
    script: Arc<Mutex<VecDeque<TransportResult<Option<String>>>>>,
    stall_when_empty: bool,
}

impl LineStream for MockLineStream {
    fn next_line(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<String>>> + Send + '_>> {
        Box::pin(async move {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => {
                    if self.stall_when_empty {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                    }
                    Ok(None)
                }
            }
        })
    }
}

struct MockFrameSocket {
    incoming: Arc<Mutex<VecDeque<TransportResult<Option<Vec<u8>>>>>>,
    outgoing: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<Mutex<bool>>,
    stall_when_empty: bool,
}

impl FrameSocket for MockFrameSocket {
    fn send(
        &mut self,
        frame: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.outgoing.lock().unwrap().push(frame);
            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<Vec<u8>>>> + Send + '_>> {
        Box::pin(async move {
            let next = self.incoming.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => {
                    if self.stall_when_empty {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                    }
                    Ok(None)
                }
            }
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            *self.closed.lock().unwrap() = true;
            Ok(())
        })
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! caravel-client: Streaming protocol client for a cluster control-plane API
//!
//! This crate implements the protocol layer beneath the resource-kind
//! boilerplate:
//!
//! - A long-lived **watch engine** consuming newline-delimited JSON change
//!   events over a streaming GET
//! - A **channel multiplexer** running remote commands over a single
//!   WebSocket carrying five logical byte streams
//! - **Structured patch** submission for the two standard patch wire formats
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌───────────────┐
//! │    Client    │────►│  Transport  │────►│ Control plane │
//! │ (watch/exec) │◄────│   (trait)   │◄────│  (HTTP / WS)  │
//! └──────────────┘     └─────────────┘     └───────────────┘
//! ```
//!
//! Resource-kind layers hand paths in and get opaque structured records
//! back; this crate never interprets resource fields beyond the watch
//! cursor (`metadata.resourceVersion`).

pub mod client;
pub mod exec;
pub mod transport;
pub mod watch;

pub use caravel_core::{
    Channel, ChannelFrame, ExecMessage, JsonPatch, MergePatch, PatchOp, TerminalSize, WatchEvent,
    WatchEventType, WatchFlow,
};
pub use client::{Client, ClientError};
pub use exec::{AttachSession, ExecOptions};
pub use transport::{
    FrameSocket, HttpTransport, LineStream, Transport, TransportConfig, TransportError,
    TransportResult,
};
pub use watch::{WatchOptions, WatchOutcome};

#[cfg(test)]
mod test_helpers;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! caravel-core: Protocol data model for the caravel control-plane client
//!
//! This crate provides the wire-level data structures shared by the caravel
//! client: watch events, multiplexed channel frames, exec messages, and the
//! JSON Patch / JSON Merge Patch builders.

pub mod channel;
pub mod error;
pub mod event;
pub mod json_patch;
pub mod merge_patch;

pub use channel::{Channel, ChannelFrame, ExecMessage, TerminalSize};
pub use error::{Error, Result};
pub use event::{WatchEvent, WatchEventType, WatchFlow};
pub use json_patch::{JsonPatch, PatchOp};
pub use merge_patch::MergePatch;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Multiplexed channel frames for exec and attach sessions.
//!
//! A single WebSocket connection carries five logical byte streams. Every
//! frame is one channel byte followed by the raw payload; there is no other
//! framing metadata. The channel table is fixed by the remote-command
//! protocol and anything outside it is a violation, not a new channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the five fixed logical channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Client-to-server process input.
    Stdin = 0,
    /// Server-to-client process output.
    Stdout = 1,
    /// Server-to-client process errors.
    Stderr = 2,
    /// Server-to-client terminal status object.
    Error = 3,
    /// Client-to-server terminal size updates.
    Resize = 4,
}

impl Channel {
    /// The channel's wire index.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The channel's conventional name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Stdin => "stdin",
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
            Channel::Error => "error",
            Channel::Resize => "resize",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Channel::Stdin),
            1 => Ok(Channel::Stdout),
            2 => Ok(Channel::Stderr),
            3 => Ok(Channel::Error),
            4 => Ok(Channel::Resize),
            other => Err(Error::Protocol(format!("unknown channel byte: {other}"))),
        }
    }
}

/// One frame on the multiplexed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFrame {
    /// The logical channel this frame belongs to.
    pub channel: Channel,
    /// The raw payload bytes, channel byte stripped.
    pub payload: Vec<u8>,
}

impl ChannelFrame {
    /// Creates a frame for the given channel.
    pub fn new(channel: Channel, payload: impl Into<Vec<u8>>) -> Self {
        ChannelFrame {
            channel,
            payload: payload.into(),
        }
    }

    /// Encodes the frame for the wire: one channel byte, then the payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.payload.len());
        buf.push(self.channel.index());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decodes a wire frame by its leading channel byte.
    ///
    /// An empty frame has no channel byte and is a protocol violation; an
    /// empty payload is fine.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let (first, rest) = raw
            .split_first()
            .ok_or_else(|| Error::Protocol("empty frame".to_string()))?;

        Ok(ChannelFrame {
            channel: Channel::try_from(*first)?,
            payload: rest.to_vec(),
        })
    }
}

/// The public, decoded form of an inbound frame.
///
/// Named by channel rather than wire index, with the payload decoded as
/// (lossy) UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecMessage {
    /// The channel the output arrived on.
    pub channel: Channel,
    /// The decoded payload.
    pub output: String,
}

impl ExecMessage {
    /// Decodes a frame's payload into a message.
    pub fn from_frame(frame: &ChannelFrame) -> Self {
        ExecMessage {
            channel: frame.channel,
            output: String::from_utf8_lossy(&frame.payload).into_owned(),
        }
    }

    /// Builds a synthetic error-channel message for a frame that violated
    /// the protocol. Bad frames are surfaced, never dropped.
    pub fn protocol_error(message: impl Into<String>) -> Self {
        ExecMessage {
            channel: Channel::Error,
            output: message.into(),
        }
    }
}

/// Terminal dimensions sent on the resize channel.
///
/// The wire shape uses capitalized keys: `{"Width": 80, "Height": 24}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
    /// Columns.
    #[serde(rename = "Width")]
    pub width: u16,
    /// Rows.
    #[serde(rename = "Height")]
    pub height: u16,
}

impl TerminalSize {
    /// Creates a terminal size.
    pub fn new(width: u16, height: u16) -> Self {
        TerminalSize { width, height }
    }

    /// Encodes the size as a resize-channel frame.
    pub fn to_frame(self) -> Result<ChannelFrame> {
        Ok(ChannelFrame::new(Channel::Resize, serde_json::to_vec(&self)?))
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;

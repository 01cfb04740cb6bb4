// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket channel multiplexer: exec and attach sessions.
//!
//! One WebSocket connection carries five logical channels (stdin, stdout,
//! stderr, error, resize), each frame prefixed with a single channel byte.
//! `exec` collects everything the server sends into an ordered message list;
//! `attach` hands back a live session the caller drives itself. Both are
//! bounded by the transport's single inherited timeout.

use caravel_core::{Channel, ChannelFrame, ExecMessage, TerminalSize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::{Client, ClientError};
use crate::transport::{FrameSocket, Transport};

/// Options for an exec or attach session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Target container within the workload, if it has more than one.
    pub container: Option<String>,
    /// Open the stdin channel.
    pub stdin: bool,
    /// Open the stdout channel.
    pub stdout: bool,
    /// Open the stderr channel.
    pub stderr: bool,
    /// Allocate a TTY for the remote process.
    pub tty: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            container: None,
            stdin: false,
            stdout: true,
            stderr: true,
            tty: false,
        }
    }
}

impl ExecOptions {
    /// Renders the options (and command, one `command=` pair per argument)
    /// as the endpoint query string.
    pub fn query_string(&self, command: &[&str]) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for arg in command {
            query.append_pair("command", arg);
        }
        if let Some(container) = &self.container {
            query.append_pair("container", container);
        }
        query.append_pair("stdin", bool_str(self.stdin));
        query.append_pair("stdout", bool_str(self.stdout));
        query.append_pair("stderr", bool_str(self.stderr));
        query.append_pair("tty", bool_str(self.tty));
        query.finish()
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl<T: Transport> Client<T> {
    /// Runs a command in a workload and collects all output.
    ///
    /// Frames are decoded into [`ExecMessage`]s in arrival order until the
    /// server closes the connection or the transport's timeout elapses; on
    /// timeout the messages collected so far are returned.
    pub async fn exec(
        &self,
        path: &str,
        command: &[&str],
        options: &ExecOptions,
    ) -> Result<Vec<ExecMessage>, ClientError> {
        let target = format!(
            "{}/exec?{}",
            path.trim_end_matches('/'),
            options.query_string(command)
        );
        let mut socket = self.transport.open_channels(&target).await?;
        let deadline = Instant::now() + self.transport.timeout();
        let mut messages = Vec::new();

        loop {
            match tokio::time::timeout_at(deadline, socket.recv()).await {
                Ok(Ok(Some(raw))) => messages.push(decode_inbound(&raw)),
                Ok(Ok(None)) => {
                    debug!("exec stream closed, {} messages collected", messages.len());
                    break;
                }
                Ok(Err(e)) => {
                    let _ = socket.close().await;
                    return Err(e.into());
                }
                Err(_) => {
                    debug!(
                        "exec session timed out, returning {} partial messages",
                        messages.len()
                    );
                    let _ = socket.close().await;
                    break;
                }
            }
        }

        Ok(messages)
    }

    /// Attaches to the I/O of an already-running process.
    ///
    /// Returns a live session the caller drives: write stdin and resize
    /// frames, pull messages, and close when finished. The transport's
    /// timeout still force-closes an overlong session.
    pub async fn attach(
        &self,
        path: &str,
        options: &ExecOptions,
    ) -> Result<AttachSession, ClientError> {
        let target = format!(
            "{}/attach?{}",
            path.trim_end_matches('/'),
            options.query_string(&[])
        );
        let socket = self.transport.open_channels(&target).await?;

        Ok(AttachSession {
            socket,
            deadline: Instant::now() + self.transport.timeout(),
        })
    }
}

/// Decodes one inbound frame, absorbing violations into the message stream.
///
/// The server only legitimately sends stdout, stderr, and error frames;
/// anything else (including an undecodable frame) becomes an error-channel
/// message rather than being dropped.
fn decode_inbound(raw: &[u8]) -> ExecMessage {
    match ChannelFrame::decode(raw) {
        Ok(frame) => match frame.channel {
            Channel::Stdout | Channel::Stderr | Channel::Error => ExecMessage::from_frame(&frame),
            Channel::Stdin | Channel::Resize => {
                warn!("server sent client-only channel {}", frame.channel);
                ExecMessage::protocol_error(format!(
                    "unexpected inbound channel: {}",
                    frame.channel
                ))
            }
        },
        Err(e) => {
            warn!("undecodable frame: {}", e);
            ExecMessage::protocol_error(e.to_string())
        }
    }
}

/// A live attach session over one multiplexed connection.
///
/// The caller owns the session and is responsible for closing it; dropping
/// it closes the underlying socket as well.
pub struct AttachSession {
    socket: Box<dyn FrameSocket>,
    deadline: Instant,
}

impl AttachSession {
    /// Sends bytes on the stdin channel.
    pub async fn write_stdin(&mut self, data: &[u8]) -> Result<(), ClientError> {
        let frame = ChannelFrame::new(Channel::Stdin, data);
        self.socket.send(frame.encode()).await?;
        Ok(())
    }

    /// Sends a terminal-size update on the resize channel.
    pub async fn resize(&mut self, width: u16, height: u16) -> Result<(), ClientError> {
        let frame = TerminalSize::new(width, height).to_frame()?;
        self.socket.send(frame.encode()).await?;
        Ok(())
    }

    /// Receives the next message.
    ///
    /// Returns `None` when the server closed the connection or the session's
    /// deadline elapsed (which force-closes the socket).
    pub async fn next_message(&mut self) -> Result<Option<ExecMessage>, ClientError> {
        match tokio::time::timeout_at(self.deadline, self.socket.recv()).await {
            Ok(Ok(Some(raw))) => Ok(Some(decode_inbound(&raw))),
            Ok(Ok(None)) => Ok(None),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                debug!("attach session timed out, force-closing");
                let _ = self.socket.close().await;
                Ok(None)
            }
        }
    }

    /// Dispatches every remaining message to a handler until the connection
    /// closes or the deadline elapses.
    pub async fn for_each<F>(&mut self, mut handler: F) -> Result<(), ClientError>
    where
        F: FnMut(ExecMessage),
    {
        while let Some(message) = self.next_message().await? {
            handler(message);
        }
        Ok(())
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.socket.close().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;

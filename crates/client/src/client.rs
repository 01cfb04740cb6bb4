// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client facade over a configured transport.
//!
//! One `Client` serves any number of sequential or concurrent calls; each
//! watch/exec/attach call owns its own connection and cursor, so no mutable
//! state is shared between them.

use caravel_core::{JsonPatch, MergePatch};
use tracing::debug;

use crate::transport::{HttpTransport, Transport, TransportConfig, TransportError};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol-level decode error.
    #[error("protocol error: {0}")]
    Protocol(#[from] caravel_core::Error),

    /// The watch handler asked for the call to fail.
    #[error("watch aborted by handler")]
    Aborted,
}

/// Streaming client for a cluster control-plane API.
pub struct Client<T: Transport = HttpTransport> {
    pub(crate) transport: T,
}

impl Client<HttpTransport> {
    /// Creates a client with the default HTTP/WebSocket transport.
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        Ok(Client {
            transport: HttpTransport::new(config)?,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client with a custom transport (for testing).
    pub fn with_transport(transport: T) -> Self {
        Client { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submits a JSON Patch (RFC 6902) to a resource.
    ///
    /// An empty builder is a semantically empty patch; no request is sent.
    pub async fn patch_json(&self, path: &str, patch: &JsonPatch) -> Result<String, ClientError> {
        if patch.is_empty() {
            debug!("skipping empty json patch for {}", path);
            return Ok(String::new());
        }

        let body = patch.to_json()?;
        let response = self
            .transport
            .request("PATCH", path, Some(body), Some(JsonPatch::CONTENT_TYPE))
            .await?;
        Ok(response)
    }

    /// Submits a JSON Merge Patch (RFC 7396) to a resource.
    ///
    /// An empty builder is a semantically empty patch; no request is sent.
    pub async fn patch_merge(&self, path: &str, patch: &MergePatch) -> Result<String, ClientError> {
        if patch.is_empty() {
            debug!("skipping empty merge patch for {}", path);
            return Ok(String::new());
        }

        let body = patch.to_json()?;
        let response = self
            .transport
            .request("PATCH", path, Some(body), Some(MergePatch::CONTENT_TYPE))
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

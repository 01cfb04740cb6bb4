// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for caravel-core operations.

use thiserror::Error;

/// All possible errors that can occur in caravel-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A received line or frame could not be parsed.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A frame or event violated the protocol's fixed structure.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// A specialized Result type for caravel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

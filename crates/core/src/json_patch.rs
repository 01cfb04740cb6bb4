// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Patch (RFC 6902) builder.
//!
//! Accumulates an ordered list of patch operations and serializes it to the
//! `application/json-patch+json` wire format. Operations are kept exactly in
//! call order; nothing is merged, reordered, or deduplicated. Paths are not
//! validated against the target resource, validation is the control plane's
//! job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One RFC 6902 patch operation.
///
/// The enum shape fixes the field set per operation kind: `remove` never
/// carries a value, `move`/`copy` always carry `from` and `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert a value at a path.
    Add { path: String, value: Value },
    /// Delete the value at a path.
    Remove { path: String },
    /// Overwrite the value at a path.
    Replace { path: String, value: Value },
    /// Move the value at `from` to `path`.
    Move { from: String, path: String },
    /// Copy the value at `from` to `path`.
    Copy { from: String, path: String },
    /// Assert that `path` currently holds `value`.
    Test { path: String, value: Value },
}

impl PatchOp {
    /// The operation's target path.
    pub fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Remove { path }
            | PatchOp::Replace { path, .. }
            | PatchOp::Move { path, .. }
            | PatchOp::Copy { path, .. }
            | PatchOp::Test { path, .. } => path,
        }
    }
}

/// Ordered JSON Patch builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonPatch {
    ops: Vec<PatchOp>,
}

impl JsonPatch {
    /// The wire content type for this patch format.
    pub const CONTENT_TYPE: &'static str = "application/json-patch+json";

    /// Creates an empty patch.
    pub fn new() -> Self {
        JsonPatch::default()
    }

    /// Appends an `add` operation.
    pub fn add(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.ops.push(PatchOp::Add {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a `remove` operation.
    pub fn remove(&mut self, path: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Remove { path: path.into() });
        self
    }

    /// Appends a `replace` operation.
    pub fn replace(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.ops.push(PatchOp::Replace {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a `move` operation from `from` to `to`.
    pub fn move_from(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Move {
            from: from.into(),
            path: to.into(),
        });
        self
    }

    /// Appends a `copy` operation from `from` to `to`.
    pub fn copy_from(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.ops.push(PatchOp::Copy {
            from: from.into(),
            path: to.into(),
        });
        self
    }

    /// Appends a `test` operation.
    pub fn test(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.ops.push(PatchOp::Test {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    /// Whether no operations have been recorded.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Discards all recorded operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// The recorded operations, in call order.
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Serializes the operation list to a JSON array value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.ops)?)
    }

    /// Serializes the operation list to the wire body.
    ///
    /// An empty builder serializes to `[]`, a semantically empty patch.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.ops)?)
    }
}

#[cfg(test)]
#[path = "json_patch_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Merge Patch (RFC 7396) builder.
//!
//! Accumulates field-level changes as a nested tree and serializes it to the
//! `application/merge-patch+json` wire format. A `null` leaf is the format's
//! tombstone for "delete this field"; the wire makes no distinction between
//! removing a field and setting it to null, so neither does the builder.

use serde_json::{Map, Value};

use crate::error::Result;

/// Nested merge-tree builder addressed by dotted paths.
///
/// `set("spec.replicas", 5)` produces `{"spec": {"replicas": 5}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePatch {
    root: Map<String, Value>,
}

impl MergePatch {
    /// The wire content type for this patch format.
    pub const CONTENT_TYPE: &'static str = "application/merge-patch+json";

    /// Creates an empty patch.
    pub fn new() -> Self {
        MergePatch::default()
    }

    /// Writes `value` at the nested location named by `path`.
    ///
    /// Intermediate levels are created as plain objects; a non-object
    /// intermediate left by an earlier write is replaced. Repeated writes to
    /// the same path overwrite, last write wins.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        self.insert(path, value.into());
        self
    }

    /// Marks the field at `path` for deletion by writing an explicit `null`.
    pub fn remove(&mut self, path: &str) -> &mut Self {
        self.insert(path, Value::Null);
        self
    }

    /// Shallow-overlays another patch onto this one.
    ///
    /// Top-level keys present in both are replaced wholesale by `other`'s.
    pub fn merge(&mut self, other: &MergePatch) -> &mut Self {
        for (key, value) in &other.root {
            self.root.insert(key.clone(), value.clone());
        }
        self
    }

    /// Shallow-overlays a raw object tree onto this one.
    pub fn merge_object(&mut self, tree: Map<String, Value>) -> &mut Self {
        for (key, value) in tree {
            self.root.insert(key, value);
        }
        self
    }

    /// Reads the value currently written at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Whether no fields have been written.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Discards all written fields.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// The accumulated merge tree as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Serializes the merge tree to the wire body.
    ///
    /// An empty builder serializes to `{}`, a semantically empty patch.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    fn insert(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut node = &mut self.root;
        for segment in segments {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry.as_object_mut() {
                Some(map) => map,
                None => return,
            };
        }
        node.insert(last.to_string(), value);
    }
}

#[cfg(test)]
#[path = "merge_patch_tests.rs"]
mod tests;

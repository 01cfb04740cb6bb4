// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format specs for the structured patch builders.

#![allow(clippy::unwrap_used)]

use caravel_client::{JsonPatch, MergePatch};
use serde_json::json;

#[test]
fn json_patch_operations_serialize_in_call_order() {
    let mut patch = JsonPatch::new();
    patch
        .test("/spec/replicas", 3)
        .replace("/spec/replicas", 5)
        .add("/metadata/labels/rollout", "blue")
        .remove("/metadata/annotations/stale")
        .move_from("/spec/old", "/spec/new")
        .copy_from("/spec/new", "/spec/backup");

    assert_eq!(
        patch.to_value().unwrap(),
        json!([
            {"op": "test", "path": "/spec/replicas", "value": 3},
            {"op": "replace", "path": "/spec/replicas", "value": 5},
            {"op": "add", "path": "/metadata/labels/rollout", "value": "blue"},
            {"op": "remove", "path": "/metadata/annotations/stale"},
            {"op": "move", "from": "/spec/old", "path": "/spec/new"},
            {"op": "copy", "from": "/spec/new", "path": "/spec/backup"},
        ])
    );
}

#[test]
fn json_patch_remove_never_carries_a_value() {
    let mut patch = JsonPatch::new();
    patch.remove("/metadata/labels/old");

    let value = patch.to_value().unwrap();
    let op = value.as_array().unwrap()[0].as_object().unwrap();
    assert!(!op.contains_key("value"));
    assert!(!op.contains_key("from"));
}

#[test]
fn json_patch_add_then_remove_scenario() {
    let mut patch = JsonPatch::new();
    patch
        .add("/metadata/labels/app", "x")
        .remove("/metadata/labels/old");

    assert_eq!(
        patch.to_value().unwrap(),
        json!([
            {"op": "add", "path": "/metadata/labels/app", "value": "x"},
            {"op": "remove", "path": "/metadata/labels/old"},
        ])
    );
}

#[test]
fn merge_patch_set_and_remove_scenario() {
    let mut patch = MergePatch::new();
    patch.set("spec.replicas", 5).remove("metadata.labels.app");

    assert_eq!(
        patch.to_value(),
        json!({
            "spec": {"replicas": 5},
            "metadata": {"labels": {"app": null}},
        })
    );
}

#[test]
fn merge_patch_overlapping_paths_later_call_wins() {
    let mut patch = MergePatch::new();
    patch.set("spec.replicas", 1);
    patch.set("spec.replicas", 2);
    patch.remove("spec.replicas");
    assert_eq!(patch.get("spec.replicas"), Some(&json!(null)));

    patch.set("spec.replicas", 9);
    assert_eq!(patch.get("spec.replicas"), Some(&json!(9)));
}

#[test]
fn both_builders_empty_then_cleared_states_match() {
    let mut json_patch = JsonPatch::new();
    let mut merge_patch = MergePatch::new();
    assert!(json_patch.is_empty());
    assert!(merge_patch.is_empty());
    assert_eq!(json_patch.to_json().unwrap(), "[]");
    assert_eq!(merge_patch.to_json().unwrap(), "{}");

    json_patch.add("/a", 1);
    merge_patch.set("a", 1);
    json_patch.clear();
    merge_patch.clear();

    assert!(json_patch.is_empty());
    assert!(merge_patch.is_empty());
    assert_eq!(json_patch.to_json().unwrap(), "[]");
    assert_eq!(merge_patch.to_json().unwrap(), "{}");
}

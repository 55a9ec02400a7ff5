//! Deep-merge helper shared by `Agent::set`, the `SetState` effect, and
//! the Direct strategy's result-merging step.

use serde_json::{Map, Value};

/// Deep-merge `patch` into `base`. Nested objects merge recursively;
/// any other value (including arrays) in `patch` overwrites the value
/// at that key in `base`.
pub fn deep_merge(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, patch_value) in patch {
        match base.get_mut(&key) {
            Some(Value::Object(base_obj)) => {
                if let Value::Object(patch_obj) = patch_value {
                    deep_merge(base_obj, patch_obj);
                } else {
                    base.insert(key, patch_value);
                }
            }
            _ => {
                base.insert(key, patch_value);
            }
        }
    }
}

/// Set a nested value at `path` (a sequence of object keys), creating
/// intermediate objects as needed.
pub fn set_path(root: &mut Map<String, Value>, path: &[String], value: Value) {
    match path.split_first() {
        None => {}
        Some((head, rest)) if rest.is_empty() => {
            root.insert(head.clone(), value);
        }
        Some((head, rest)) => {
            let entry = root
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                set_path(nested, rest, value);
            }
        }
    }
}

/// Remove a nested value at `path`. A missing intermediate path is a
/// silent no-op (there is nothing to delete).
pub fn delete_path(root: &mut Map<String, Value>, path: &[String]) {
    match path.split_first() {
        None => {}
        Some((head, rest)) if rest.is_empty() => {
            root.remove(head);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(nested)) = root.get_mut(head) {
                delete_path(nested, rest);
            }
        }
    }
}

/// Read a nested value at `path`, if present.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &[String]) -> Option<&'a Value> {
    match path.split_first() {
        None => None,
        Some((head, rest)) if rest.is_empty() => root.get(head),
        Some((head, rest)) => match root.get(head) {
            Some(Value::Object(nested)) => get_path(nested, rest),
            _ => None,
        },
    }
}

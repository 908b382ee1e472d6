//! Tree analyzer (component E, analysis half): a recursive, concurrent
//! walk of the desired document that classifies every subtree as a
//! collection, a leaf settings map, an intermediate container, or a no-op,
//! and fans out to the list/dict reconcilers accordingly.

use std::collections::BTreeSet;

use futures::future::{BoxFuture, FutureExt};
use mtsync_error::{MtsyncError, Result};
use serde_json::Value;

use crate::action::Action;
use crate::device::DeviceClient;
use crate::item::Item;
use crate::reconcile;

/// Walks `tree` from `current_path`, recursing into mappings, dispatching
/// lists to the list reconciler and string-valued mappings to the dict
/// reconciler. Sibling subtrees at each level analyze concurrently.
pub fn analyze<'a, D: DeviceClient>(
    device: &'a D,
    current_path: String,
    tree: Value,
    non_movable: &'a BTreeSet<String>,
) -> BoxFuture<'a, Result<Vec<Action>>> {
    async move {
        // A null subtree is a no-op even at the root — mirrors the
        // per-key null rule below, applied once more generally.
        if tree.is_null() {
            return Ok(vec![]);
        }

        let Value::Object(map) = &tree else {
            return Err(MtsyncError::input_malformed(format!(
                "expected an object at {current_path:?}, found {}",
                describe(&tree)
            )));
        };

        let analyses = map.iter().map(|(key, value)| {
            let item_path = format!("{current_path}/{key}");
            analyze_node(device, item_path, value.clone(), non_movable)
        });

        let results = futures::future::join_all(analyses).await;

        let mut actions = Vec::new();
        for result in results {
            actions.extend(result?);
        }
        Ok(actions)
    }
    .boxed()
}

fn analyze_node<'a, D: DeviceClient>(
    device: &'a D,
    path: String,
    value: Value,
    non_movable: &'a BTreeSet<String>,
) -> BoxFuture<'a, Result<Vec<Action>>> {
    async move {
        match &value {
            Value::Null => Ok(vec![]),
            Value::Array(_) => {
                let items = to_item_list(&value, &path)?;
                reconcile::reconcile_list(device, &path, &items, non_movable).await
            }
            Value::Object(map) => {
                if is_leaf_settings(map) {
                    let item = to_item(&value, &path)?;
                    reconcile::reconcile_dict(device, &path, &item).await
                } else {
                    analyze(device, path, value.clone(), non_movable).await
                }
            }
            other => Err(MtsyncError::input_malformed(format!(
                "value at {path:?} is neither null, an object, nor a list of objects (found {})",
                describe(other)
            ))),
        }
    }
    .boxed()
}

/// A mapping is a leaf settings node when it is non-empty and its first
/// value, by insertion order, is a string — everything else (including the
/// empty mapping) is an intermediate container to recurse into.
fn is_leaf_settings(map: &serde_json::Map<String, Value>) -> bool {
    map.values().next().is_some_and(Value::is_string)
}

fn to_item(value: &Value, path: &str) -> Result<Item> {
    let Value::Object(map) = value else {
        return Err(MtsyncError::input_malformed(format!(
            "expected a settings object at {path:?}, found {}",
            describe(value)
        )));
    };

    map.iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            other => Err(MtsyncError::input_malformed(format!(
                "expected a string value for {path:?}.{k:?}, found {}",
                describe(other)
            ))),
        })
        .collect()
}

fn to_item_list(value: &Value, path: &str) -> Result<Vec<Item>> {
    let Value::Array(items) = value else {
        return Err(MtsyncError::input_malformed(format!(
            "expected a list of objects at {path:?}, found {}",
            describe(value)
        )));
    };

    items.iter().map(|item| to_item(item, path)).collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtsync_error::Result as MResult;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDevice {
        collection_calls: Arc<Mutex<Vec<String>>>,
        dict_calls: Arc<Mutex<Vec<String>>>,
    }

    impl DeviceClient for RecordingDevice {
        async fn get_collection(&self, path: &str, _proplist: &[String]) -> MResult<Vec<Item>> {
            self.collection_calls.lock().unwrap().push(path.to_string());
            Ok(vec![])
        }

        async fn get_leaf(&self, path: &str) -> MResult<Item> {
            self.dict_calls.lock().unwrap().push(path.to_string());
            Ok(Item::new())
        }

        async fn patch(&self, _path: &str, _body: &Item) -> MResult<Option<Value>> {
            Ok(None)
        }
        async fn put(&self, _path: &str, _body: &Item) -> MResult<Option<Value>> {
            Ok(None)
        }
        async fn delete(&self, _path: &str) -> MResult<Option<Value>> {
            Ok(None)
        }
        async fn post(&self, _path: &str, _body: &Item) -> MResult<Option<Value>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn empty_tree_yields_no_actions() {
        let device = RecordingDevice::default();
        let actions = analyze(&device, String::new(), json!({}), &BTreeSet::new())
            .await
            .unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn null_tree_yields_no_actions() {
        let device = RecordingDevice::default();
        let actions = analyze(&device, String::new(), Value::Null, &BTreeSet::new())
            .await
            .unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn list_at_root_is_malformed() {
        let device = RecordingDevice::default();
        let result = analyze(&device, String::new(), json!([]), &BTreeSet::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_value_dispatches_to_list_reconciler() {
        let device = RecordingDevice::default();
        let tree = json!({
            "ipv6": {
                "address": [
                    {"interface": "bridge", "address": "2010::7/64", "disabled": "false"},
                    {"interface": "bridge", "address": "2010::1/64", "disabled": "false"},
                ]
            }
        });
        analyze(&device, String::new(), tree, &BTreeSet::new())
            .await
            .unwrap();
        assert_eq!(
            device.collection_calls.lock().unwrap().as_slice(),
            &["/ipv6/address".to_string()]
        );
    }

    #[tokio::test]
    async fn string_valued_mapping_dispatches_to_dict_reconciler() {
        let device = RecordingDevice::default();
        let tree = json!({"ip": {"settings": {"rp-filter": "no"}}});
        analyze(&device, String::new(), tree, &BTreeSet::new())
            .await
            .unwrap();
        assert_eq!(
            device.dict_calls.lock().unwrap().as_slice(),
            &["/ip/settings".to_string()]
        );
    }

    #[tokio::test]
    async fn non_string_leaf_value_is_malformed() {
        let device = RecordingDevice::default();
        let tree = json!({"ip": {"settings": {"rp-filter": 1}}});
        let result = analyze(&device, String::new(), tree, &BTreeSet::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn item_conversion_rejects_non_string_values() {
        let value = json!({"a": "ok", "b": 1});
        assert!(to_item(&value, "/p").is_err());
    }

    #[test]
    fn item_list_conversion_requires_array() {
        let value = json!({"not": "a list"});
        assert!(to_item_list(&value, "/p").is_err());
    }
}

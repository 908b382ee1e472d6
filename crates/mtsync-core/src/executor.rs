//! Action executor (component E, execution half): sorts the aggregated
//! action list by kind and dispatches it strictly sequentially. No
//! batching, no pipelining — every action observably mutates the device
//! and later actions (especially POST `move`) depend on earlier ones
//! having already taken effect.

use mtsync_error::{MtsyncError, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::action::{Action, ActionKind};
use crate::device::DeviceClient;

/// Sorts `actions` by kind and applies them one at a time, returning as
/// soon as one fails. No rollback is attempted on failure.
pub async fn execute<D: DeviceClient>(device: &D, mut actions: Vec<Action>) -> Result<()> {
    Action::sort_for_execution(&mut actions);

    log_plan(&actions);

    for action in &actions {
        let response = dispatch(device, action).await?;
        check_response(action, response)?;
        debug!(path = %action.path, kind = ?action.kind, "action applied");
    }

    Ok(())
}

fn log_plan(actions: &[Action]) {
    let count = |kind: ActionKind| actions.iter().filter(|a| a.kind == kind).count();
    info!(
        patch = count(ActionKind::Patch),
        put = count(ActionKind::Put),
        delete = count(ActionKind::Delete),
        post = count(ActionKind::Post),
        total = actions.len(),
        "applying actions"
    );
}

async fn dispatch<D: DeviceClient>(device: &D, action: &Action) -> Result<Option<Value>> {
    match action.kind {
        ActionKind::Patch => device.patch(&action.path, &action.set_dict).await,
        ActionKind::Put => device.put(&action.path, &action.set_dict).await,
        ActionKind::Delete => device.delete(&action.path).await,
        ActionKind::Post => device.post(&action.path, &action.set_dict).await,
    }
}

/// A response is only a failure when it is a JSON object containing an
/// `error` key — with one exception: a `/move` request whose `detail` is
/// `"no such command"` is silently ignored, since some older device
/// firmware lacks `move` on collections that are not in the static
/// non-movable set.
fn check_response(action: &Action, response: Option<Value>) -> Result<()> {
    let Some(Value::Object(map)) = &response else {
        return Ok(());
    };
    let Some(error) = map.get("error") else {
        return Ok(());
    };

    let detail = map.get("detail").and_then(Value::as_str);

    if action.path.ends_with("/move") && detail == Some("no such command") {
        return Ok(());
    }

    Err(MtsyncError::DeviceError {
        path: action.path.clone(),
        detail: detail.map(String::from).or_else(|| Some(error.to_string())),
    })
}

//! Concrete [`DeviceClient`] over a RouterOS-class device's REST API.
//!
//! Every request is built against `https://{hostname}/rest{path}`, carries
//! HTTP Basic auth and a JSON content type, and tolerates an empty response
//! body by treating it as `null` rather than a parse error — the device
//! returns no body at all for a number of successful mutations.

use mtsync_config::Settings;
use mtsync_core::item::Item;
use mtsync_core::DeviceClient;
use mtsync_error::{MtsyncError, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// One connection to a device, holding the pooled HTTP client and the
/// resolved settings needed on every request.
#[derive(Clone)]
pub struct Connection {
    client: Client,
    hostname: String,
    username: String,
    password: String,
}

impl Connection {
    /// Builds a connection from validated settings. `settings.valid()` must
    /// already hold — this does not re-check hostname/username emptiness.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(settings.ignore_certificate_errors)
            .build()?;

        Ok(Connection {
            client,
            hostname: settings.hostname.clone().unwrap_or_default(),
            username: settings.username.clone().unwrap_or_default(),
            password: settings.password.clone().unwrap_or_default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("https://{}/rest{path}", self.hostname)
    }

    async fn call(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<Value>> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            MtsyncError::invariant(format!("malformed JSON response: {e}"))
        })?;
        Ok(Some(value))
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let request = self.client.get(self.url(path)).query(query);
        self.call(request).await
    }
}

fn value_to_item(value: Value, path: &str) -> Result<Item> {
    let Value::Object(map) = value else {
        return Err(MtsyncError::invariant(format!(
            "expected a JSON object from {path}"
        )));
    };

    map.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k, s)),
            other => Err(MtsyncError::invariant(format!(
                "expected a string value for {path}.{k:?}, found {other}"
            ))),
        })
        .collect()
}

impl DeviceClient for Connection {
    async fn get_collection(&self, path: &str, proplist: &[String]) -> Result<Vec<Item>> {
        let joined = proplist.join(",");
        let query = [("dynamic", "false"), (".proplist", joined.as_str())];
        let response = self.get(path, &query).await?;

        match response {
            None => Ok(vec![]),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| value_to_item(item, path))
                .collect(),
            Some(_) => Err(MtsyncError::invariant(format!(
                "expected a JSON array from collection {path}"
            ))),
        }
    }

    async fn get_leaf(&self, path: &str) -> Result<Item> {
        match self.get(path, &[]).await? {
            None => Ok(Item::new()),
            Some(value) => value_to_item(value, path),
        }
    }

    async fn patch(&self, path: &str, body: &Item) -> Result<Option<Value>> {
        debug!(path, "PATCH");
        self.call(self.client.patch(self.url(path)).json(body)).await
    }

    async fn put(&self, path: &str, body: &Item) -> Result<Option<Value>> {
        debug!(path, "PUT");
        self.call(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Option<Value>> {
        debug!(path, "DELETE");
        self.call(self.client.delete(self.url(path))).await
    }

    async fn post(&self, path: &str, body: &Item) -> Result<Option<Value>> {
        debug!(path, "POST");
        self.call(self.client.post(self.url(path)).json(body)).await
    }
}

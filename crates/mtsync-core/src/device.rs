//! The boundary between the pure reconciliation core and the device's REST
//! surface. `mtsync-core` never links against an HTTP client directly —
//! every network-touching function here is generic over `DeviceClient`, so
//! the reconciler can be exercised against an in-memory fake in tests and
//! against the real `reqwest`-backed client (see the `mtsync-device` crate)
//! in production.

use std::future::Future;

use mtsync_error::Result;
use serde_json::Value;

use crate::item::Item;

/// One GET/PATCH/PUT/DELETE/POST call against `https://{hostname}/rest{path}`.
/// Implementors carry auth, TLS policy, and the underlying connection pool;
/// `mtsync-core` only needs the request/response shapes below.
pub trait DeviceClient: Clone + Send + Sync + 'static {
    /// `GET <path>?dynamic=false&.proplist=<csv>`, returning the collection's
    /// current rows restricted to `proplist` (plus `.id`, which the device
    /// always includes).
    fn get_collection(
        &self,
        path: &str,
        proplist: &[String],
    ) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// `GET <path>` on a leaf settings endpoint.
    fn get_leaf(&self, path: &str) -> impl Future<Output = Result<Item>> + Send;

    fn patch(&self, path: &str, body: &Item) -> impl Future<Output = Result<Option<Value>>> + Send;
    fn put(&self, path: &str, body: &Item) -> impl Future<Output = Result<Option<Value>>> + Send;
    fn delete(&self, path: &str) -> impl Future<Output = Result<Option<Value>>> + Send;
    fn post(&self, path: &str, body: &Item) -> impl Future<Output = Result<Option<Value>>> + Send;
}

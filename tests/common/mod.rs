//! Hand-written test doubles, in the style of the teacher's
//! `tests/api/test_helpers.rs::MockTauriApi`: canned responses keyed by
//! call name, with call counts tracked for memoization assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use inventory_crawler::{ApiClient, ApiError, CrawlConfig, DispatchPool, FetchedItem, ItemStream, Resource, Visitor};
use serde_json::Value;

fn canonical_args(args: &[(&str, String)]) -> String {
    let mut pairs: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join("&")
}

fn canonical_args_owned(args: &[(&str, &str)]) -> String {
    let owned: Vec<(&str, String)> = args.iter().map(|(k, v)| (*k, v.to_string())).collect();
    canonical_args(&owned)
}

/// Fake [`ApiClient`] with canned responses per call, registered up front
/// by the test. Unregistered roots/side-bands fail with a distinguishable
/// error; unregistered child listings yield an empty sequence (mirroring
/// the "empty children iterators" framing of scenario S1).
#[derive(Default)]
pub struct FakeApiClient {
    roots: Mutex<HashMap<String, Result<FetchedItem, ApiError>>>,
    children: Mutex<HashMap<String, Vec<Result<FetchedItem, ApiError>>>>,
    side_bands: Mutex<HashMap<String, Result<Value, ApiError>>>,
    call_counts: Mutex<HashMap<String, usize>>,
}

impl FakeApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(self, kind: &str, key: &str, result: Result<FetchedItem, ApiError>) -> Self {
        self.roots
            .lock()
            .unwrap()
            .insert(format!("{kind}/{key}"), result);
        self
    }

    pub fn with_children(
        self,
        child_kind: &str,
        args: &[(&str, &str)],
        items: Vec<Result<FetchedItem, ApiError>>,
    ) -> Self {
        let key = format!("{child_kind}::{}", canonical_args_owned(args));
        self.children.lock().unwrap().insert(key, items);
        self
    }

    pub fn with_side_band(
        self,
        name: &str,
        resource_type: &str,
        resource_key: &str,
        result: Result<Value, ApiError>,
    ) -> Self {
        self.side_bands
            .lock()
            .unwrap()
            .insert(format!("{name}/{resource_type}/{resource_key}"), result);
        self
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.call_counts.lock().unwrap().get(call).copied().unwrap_or(0)
    }

    fn record_call(&self, call: String) {
        *self.call_counts.lock().unwrap().entry(call).or_insert(0) += 1;
    }
}

#[async_trait]
impl ApiClient for FakeApiClient {
    async fn fetch_root(&self, kind: &str, key: &str) -> Result<FetchedItem, ApiError> {
        self.record_call(format!("fetch_root:{kind}/{key}"));
        self.roots
            .lock()
            .unwrap()
            .get(&format!("{kind}/{key}"))
            .cloned()
            .unwrap_or_else(|| Err(ApiError::execution("Not found")))
    }

    fn iter_children(&self, child_kind: &str, args: &[(&str, String)]) -> ItemStream {
        let key = format!("{child_kind}::{}", canonical_args(args));
        self.record_call(format!("iter_children:{key}"));
        let items = self
            .children
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default();
        stream::iter(items).boxed()
    }

    async fn fetch_side_band(
        &self,
        side_band: &str,
        resource_type: &str,
        resource_key: &str,
        _args: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let key = format!("{side_band}/{resource_type}/{resource_key}");
        self.record_call(format!("fetch_side_band:{key}"));
        self.side_bands
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(Err(ApiError::ResourceNotSupported))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub type_tag: String,
    pub key: String,
    pub full_resource_name: String,
}

/// Fake [`Visitor`]: records visit order and child-error reports instead
/// of writing to a real sink, so assertions read straight off `Mutex`-
/// guarded vectors. Grounded on `tests/api/test_helpers.rs::MockTauriApi`'s
/// "record everything, assert after the fact" shape.
pub struct RecordingVisitor {
    client: Arc<FakeApiClient>,
    pool: DispatchPool,
    config: CrawlConfig,
    visits: Mutex<Vec<VisitRecord>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl RecordingVisitor {
    pub fn new(client: Arc<FakeApiClient>, config: CrawlConfig) -> Self {
        let pool = DispatchPool::new(config.max_dispatch_concurrency);
        Self {
            client,
            pool,
            config,
            visits: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn visits(&self) -> Vec<VisitRecord> {
        self.visits.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn visited(&self, type_tag: &str, key: &str) -> bool {
        self.visits()
            .iter()
            .any(|record| record.type_tag == type_tag && record.key == key)
    }
}

#[async_trait]
impl Visitor for RecordingVisitor {
    async fn visit(&self, resource: &Resource) {
        self.visits.lock().unwrap().push(VisitRecord {
            type_tag: resource.type_tag().to_string(),
            key: resource.key().to_string(),
            full_resource_name: resource.full_resource_name().to_string(),
        });
    }

    fn get_client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }

    fn dispatch_pool(&self) -> &DispatchPool {
        &self.pool
    }

    fn on_child_error(&self, full_resource_name: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((full_resource_name.to_string(), message.to_string()));
    }

    fn config(&self) -> &CrawlConfig {
        &self.config
    }
}

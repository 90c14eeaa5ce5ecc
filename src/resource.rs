//! The crawled entity. See spec §3 and §4.B.
//!
//! Ambient state the original control flow kept on the object between calls
//! (`_stack`, `_visitor`) is instead threaded explicitly by the engine
//! through `accept`; the only state genuinely owned by a `Resource` across
//! its own lifetime is the parent chain (set once), its warnings, and its
//! per-instance side-band memoization — matching the "Ambient state" design
//! note.
//!
//! Interior mutability uses `Mutex`/`sync::OnceCell` rather than
//! `RefCell`/`unsync::OnceCell`: although the spec guarantees each
//! `Resource` is touched by exactly one in-flight `accept` at a time (so
//! contention never happens), child iterators hold `&Resource` across
//! `.await` points inside futures the dispatch pool spawns, which must be
//! `Send`. That requires `Resource: Sync`, which `RefCell` can't give it.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ApiError, StateError};
use crate::key::KeyStrategy;
use crate::registry::registry;

/// Side-band fetch names that participate in cache-prepopulation pairing
/// (§4.F: "computing `iam_policy` for a dataset also yields enough
/// information to derive `dataset_policy`, and vice-versa").
fn paired_side_band(resource_type: &str, name: &str) -> Option<&'static str> {
    if resource_type != "bigquery_dataset" {
        return None;
    }
    match name {
        "iam_policy" => Some("dataset_policy"),
        "dataset_policy" => Some("iam_policy"),
        _ => None,
    }
}

/// One crawled entity.
pub struct Resource {
    type_tag: &'static str,
    data: Value,
    metadata: Value,
    is_root: bool,
    parent_stack: OnceCell<Vec<Resource>>,
    warnings: Mutex<Vec<String>>,
    memoized_fetches: Mutex<HashMap<&'static str, Option<Value>>>,
    inventory_key: Mutex<Option<String>>,
    full_resource_name: OnceCell<String>,
    key: OnceCell<String>,
    timestamp: DateTime<Utc>,
}

impl Resource {
    /// Construct a resource. Used by registry constructors; not part of the
    /// public per-type API (those go through `Registry::construct`).
    pub fn new(type_tag: &'static str, data: Value, is_root: bool, metadata: Value) -> Self {
        Self {
            type_tag,
            data,
            metadata,
            is_root,
            parent_stack: OnceCell::new(),
            warnings: Mutex::new(Vec::new()),
            memoized_fetches: Mutex::new(HashMap::new()),
            inventory_key: Mutex::new(None),
            full_resource_name: OnceCell::new(),
            key: OnceCell::new(),
            timestamp: Utc::now(),
        }
    }

    /// Synthesize a placeholder for a root whose initial fetch failed.
    /// Carries minimal identifying data and a recorded warning, per the
    /// "Placeholder resource" convention (§4.D, §4.G).
    pub fn placeholder(type_tag: &'static str, root_id: &str, warning: impl Into<String>) -> Self {
        Self::placeholder_as(type_tag, root_id, warning, true)
    }

    /// As [`Self::placeholder`], but lets the caller control `is_root` —
    /// used when the failing fetch is for a composite root's child rather
    /// than the crawl's own root.
    pub(crate) fn placeholder_as(
        type_tag: &'static str,
        root_id: &str,
        warning: impl Into<String>,
        is_root: bool,
    ) -> Self {
        let resource = Self::new(
            type_tag,
            serde_json::json!({ "name": root_id }),
            is_root,
            Value::Null,
        );
        resource.add_warning(warning);
        resource
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Binds the parent chain. Called exactly once, when the engine enters
    /// `accept` for this resource. A second call is a no-op (the chain is
    /// immutable once set, per the invariant in §3).
    pub(crate) fn bind_stack(&self, stack: Vec<Resource>) {
        let _ = self.parent_stack.set(stack);
    }

    /// Fails with `NotInitialized` if called before `accept` bound the
    /// stack.
    pub fn stack(&self) -> Result<&[Resource], StateError> {
        self.parent_stack
            .get()
            .map(Vec::as_slice)
            .ok_or(StateError::NotInitialized)
    }

    /// Returns `self` if this resource is its own root, `None` if the type
    /// is registered as parentless (§4.G: organization-level curated
    /// roles), or the top of the parent stack otherwise.
    pub fn parent(&self) -> Option<&Resource> {
        if self.is_root {
            return Some(self);
        }
        if registry()
            .get(self.type_tag)
            .map(|entry| entry.parentless)
            .unwrap_or(false)
        {
            return None;
        }
        self.parent_stack.get().and_then(|stack| stack.last())
    }

    fn key_strategy(&self) -> KeyStrategy {
        registry()
            .get(self.type_tag)
            .expect("registry entry must exist for a constructed resource")
            .key_strategy
            .clone()
    }

    /// Derived per §3; stable within the run. Parents are always keyed
    /// before their children in this engine (parent-before-child
    /// traversal), so reading `parent().key()` here never recurses back
    /// through an uninitialized cell.
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| {
            let parent_info = self
                .parent()
                .filter(|p| !std::ptr::eq(*p, self))
                .map(|p| (p.type_tag, p.key().to_string()));
            self.key_strategy()
                .derive(&self.data, parent_info.as_ref().map(|(t, k)| (*t, k.as_str())))
        })
    }

    /// `"<type_tag>/<key>"`, used in warning text and `on_child_error`
    /// reporting.
    pub fn repr(&self) -> String {
        format!("{}/{}", self.type_tag, self.key())
    }

    /// Lazy, idempotent: `parent.full_resource_name / type_tag / key`, with
    /// the root contributing an empty prefix.
    pub fn full_resource_name(&self) -> &str {
        self.full_resource_name.get_or_init(|| {
            if self.is_root {
                format!("{}/{}", self.type_tag, self.key())
            } else {
                match self.parent() {
                    Some(parent) if !std::ptr::eq(parent, self) => {
                        format!("{}/{}/{}", parent.full_resource_name(), self.type_tag, self.key())
                    }
                    _ => format!("{}/{}", self.type_tag, self.key()),
                }
            }
        })
    }

    pub fn add_warning(&self, message: impl Into<String>) {
        self.warnings
            .lock()
            .expect("warnings mutex poisoned")
            .push(message.into());
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.lock().expect("warnings mutex poisoned").is_empty()
    }

    /// Joined string of all accumulated warnings.
    pub fn get_warning(&self) -> String {
        self.warnings.lock().expect("warnings mutex poisoned").join("; ")
    }

    pub fn set_inventory_key(&self, key: impl Into<String>) {
        *self.inventory_key.lock().expect("inventory_key mutex poisoned") = Some(key.into());
    }

    pub fn inventory_key(&self) -> Option<String> {
        self.inventory_key.lock().expect("inventory_key mutex poisoned").clone()
    }

    /// Policy hook; default `false`. Overridden per-type in the registry.
    pub fn should_dispatch(&self) -> bool {
        registry()
            .get(self.type_tag)
            .map(|entry| entry.dispatchable)
            .unwrap_or(false)
    }

    /// Peek at a side-band value without triggering a fetch. Returns
    /// `None` both when the name was never fetched and when it was
    /// fetched and resolved to an absent value — callers that treat
    /// "unknown" and "null" identically (§4.G's billing/API predicates)
    /// want exactly that collapse.
    pub fn cached_side_band(&self, name: &str) -> Option<Value> {
        self.memoized_fetches
            .lock()
            .expect("memoized_fetches mutex poisoned")
            .get(name)
            .cloned()
            .flatten()
    }

    /// First call for `name` on this instance invokes `args`-parameterized
    /// side-band fetch and caches the result; later calls return the cached
    /// value regardless of whether it was a success, `null`, or empty.
    /// On failure, logs, appends a warning, and caches `null`.
    pub async fn fetch_side_band(
        &self,
        name: &'static str,
        client: &dyn ApiClient,
        args: &[(&str, String)],
    ) -> Option<Value> {
        {
            let cache = self.memoized_fetches.lock().expect("memoized_fetches mutex poisoned");
            if let Some(cached) = cache.get(name) {
                return cached.clone();
            }
        }

        let result = client
            .fetch_side_band(name, self.type_tag, self.key(), args)
            .await;

        let value = match result {
            Ok(value) => Some(value),
            Err(ApiError::ResourceNotSupported) => {
                tracing::debug!(resource = %self.repr(), side_band = name, "side-band not supported, caching null");
                None
            }
            Err(ApiError::ApiExecutionError { message }) => {
                tracing::warn!(resource = %self.repr(), side_band = name, error = %message, "side-band fetch failed");
                self.add_warning(format!(
                    "failed to fetch {name} for {}: {message}",
                    self.repr()
                ));
                None
            }
        };

        {
            let mut cache = self.memoized_fetches.lock().expect("memoized_fetches mutex poisoned");
            cache.insert(name, value.clone());

            // Cache-prepopulation must not overwrite an already-set sibling entry.
            if let Some(sibling) = paired_side_band(self.type_tag, name) {
                cache.entry(sibling).or_insert_with(|| value.clone());
            }
        }

        value
    }

    /// Routes a named side-band fetch through this type's registered
    /// override if one exists (§4.G: kubernetes_cluster's `service_config`,
    /// dataproc_cluster's `iam_policy`), falling back to the generic,
    /// no-extra-args fetch otherwise. This is the one real dispatch path
    /// from a type tag to its side-band override — `types` is a private
    /// module, so nothing outside this crate can call `service_config`/
    /// `iam_policy` directly.
    pub async fn fetch_named_side_band(&self, name: &'static str, client: &dyn ApiClient) -> Option<Value> {
        let entry = registry()
            .get(self.type_tag)
            .expect("registry entry must exist for a constructed resource");
        match entry.side_band_overrides.get(name) {
            Some(fetcher) => fetcher(self, client).await,
            None => self.fetch_side_band(name, client, &[]).await,
        }
    }
}

/// `Mutex` and `sync::OnceCell` aren't `Clone`, so ancestor snapshots
/// pushed onto a child's `parent_stack` are built by hand: each clone
/// copies the already-computed values out of its source's cells rather
/// than sharing them. That's fine here — once `key`/`full_resource_name`
/// are set they never change, and a clone only ever serves as a read-only
/// ancestor entry.
impl Clone for Resource {
    fn clone(&self) -> Self {
        Self {
            type_tag: self.type_tag,
            data: self.data.clone(),
            metadata: self.metadata.clone(),
            is_root: self.is_root,
            parent_stack: clone_once_cell(&self.parent_stack),
            warnings: Mutex::new(self.warnings.lock().expect("warnings mutex poisoned").clone()),
            memoized_fetches: Mutex::new(
                self.memoized_fetches
                    .lock()
                    .expect("memoized_fetches mutex poisoned")
                    .clone(),
            ),
            inventory_key: Mutex::new(
                self.inventory_key
                    .lock()
                    .expect("inventory_key mutex poisoned")
                    .clone(),
            ),
            full_resource_name: clone_once_cell(&self.full_resource_name),
            key: clone_once_cell(&self.key),
            timestamp: self.timestamp,
        }
    }
}

fn clone_once_cell<T: Clone>(cell: &OnceCell<T>) -> OnceCell<T> {
    let clone = OnceCell::new();
    if let Some(value) = cell.get() {
        let _ = clone.set(value.clone());
    }
    clone
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("type_tag", &self.type_tag)
            .field("key", &self.key())
            .field("is_root", &self.is_root)
            .finish()
    }
}

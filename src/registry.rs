//! The process-wide, immutable type registry (component A).
//!
//! Behavior is data, not code: each type contributes one [`RegistryEntry`]
//! describing its key strategy, its child iterators, its declared parent
//! dependencies (advisory only — see §3), whether it dispatches, and
//! whether it can be the target of `from_root_id`. This replaces the
//! "dynamic subclass factory" pattern the Design Notes call out, per the
//! "declarative registry record" re-architecture.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ApiResult, RegistryError};
use crate::iterator::ChildIterator;
use crate::key::KeyStrategy;
use crate::resource::Resource;

/// A per-type side-band override: builds its own args from the resource's
/// data (and sometimes adds a warning) before delegating to the generic
/// fetch. Routed to by [`Resource::fetch_named_side_band`] — §4.G's
/// "custom iterator/fetch per type" hooks need a real dispatch path from a
/// type tag to the override, not just a free function nothing calls.
pub type SideBandFetcher = for<'a> fn(&'a Resource, &'a dyn ApiClient) -> BoxFuture<'a, Option<Value>>;

/// One registry entry: everything the engine and iterators need to know
/// about a resource kind.
#[derive(Clone)]
pub struct RegistryEntry {
    pub type_tag: &'static str,
    pub key_strategy: KeyStrategy,
    pub child_iterators: Vec<Arc<dyn ChildIterator>>,
    /// Advisory metadata only (§3): the engine enforces ordering
    /// structurally via traversal, not by consulting this list.
    pub depends_on: Vec<&'static str>,
    pub dispatchable: bool,
    /// Root-id prefix this type answers to in `from_root_id`, if any.
    pub root_prefix: Option<&'static str>,
    /// Type-specific override (§4.G, curated roles): `parent()` always
    /// returns `None` regardless of the bound stack.
    pub parentless: bool,
    /// Named side-band fetches that need type-specific arg-building
    /// (§4.G: kubernetes_cluster's `service_config`, dataproc_cluster's
    /// `iam_policy`) rather than the generic no-args fetch.
    pub side_band_overrides: HashMap<&'static str, SideBandFetcher>,
}

impl RegistryEntry {
    /// A leaf type: no children, not dispatchable, not root-fetchable.
    /// Callers override fields with the builder-style setters below.
    pub fn new(type_tag: &'static str, key_strategy: KeyStrategy) -> Self {
        Self {
            type_tag,
            key_strategy,
            child_iterators: Vec::new(),
            depends_on: Vec::new(),
            dispatchable: false,
            root_prefix: None,
            parentless: false,
            side_band_overrides: HashMap::new(),
        }
    }

    pub fn with_children(mut self, iterators: Vec<Arc<dyn ChildIterator>>) -> Self {
        self.child_iterators = iterators;
        self
    }

    pub fn depends_on(mut self, types: Vec<&'static str>) -> Self {
        self.depends_on = types;
        self
    }

    pub fn dispatchable(mut self, dispatchable: bool) -> Self {
        self.dispatchable = dispatchable;
        self
    }

    pub fn root_prefix(mut self, prefix: &'static str) -> Self {
        self.root_prefix = Some(prefix);
        self
    }

    pub fn parentless(mut self) -> Self {
        self.parentless = true;
        self
    }

    pub fn with_side_band_override(mut self, name: &'static str, fetcher: SideBandFetcher) -> Self {
        self.side_band_overrides.insert(name, fetcher);
        self
    }
}

/// Builder used once at process start to assemble the frozen registry.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, entry: RegistryEntry) -> Self {
        self.entries.insert(entry.type_tag, entry);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
        }
    }
}

/// The frozen, read-only registry. Safe to share freely once built.
pub struct Registry {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl Registry {
    pub fn get(&self, type_tag: &str) -> Result<&RegistryEntry, RegistryError> {
        self.entries
            .get(type_tag)
            .ok_or(RegistryError::UnknownType {
                type_tag: leak_for_error(type_tag),
            })
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    /// Resolve the registry entry whose `root_prefix` matches the root id's
    /// leading path segment (`"organizations"`, `"folders"`, `"projects"`).
    pub fn resolve_root_prefix(&self, prefix: &str) -> Result<&RegistryEntry, RegistryError> {
        self.entries
            .values()
            .find(|entry| entry.root_prefix == Some(prefix))
            .ok_or_else(|| RegistryError::UnsupportedRootPrefix {
                prefix: prefix.to_string(),
            })
    }

    pub fn construct(
        &self,
        type_tag: &'static str,
        data: Value,
        is_root: bool,
        metadata: Value,
    ) -> Resource {
        Resource::new(type_tag, data, is_root, metadata)
    }
}

// `RegistryError::UnknownType` wants a `&'static str`; callers only ever
// pass type tags that originated as `&'static str` literals elsewhere in
// this crate (resource type tags), so leaking here never grows unbounded
// in practice — it only fires on the "programmer error" path anyway.
fn leak_for_error(type_tag: &str) -> &'static str {
    Box::leak(type_tag.to_string().into_boxed_str())
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry, built once on first access.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| crate::types::build_registry().build())
}

/// Fetch helper used by `from_root_id`: issues the client call for the
/// matching root type and either returns the constructed resource or a
/// placeholder with a recorded warning.
pub async fn fetch_root(client: &dyn ApiClient, root_id: &str) -> Resource {
    fetch_root_as(client, root_id, true).await
}

/// As [`fetch_root`], but constructs a non-root resource. Used by the
/// composite root's iterator, whose children are themselves fetched via
/// the ordinary prefix-dispatch path but are not, themselves, the root of
/// the crawl (§6: "yields each child as a non-root sub-root").
pub(crate) async fn fetch_subroot(client: &dyn ApiClient, root_id: &str) -> Resource {
    fetch_root_as(client, root_id, false).await
}

async fn fetch_root_as(client: &dyn ApiClient, root_id: &str, is_root: bool) -> Resource {
    let mut parts = root_id.splitn(2, '/');
    let prefix = parts.next().unwrap_or_default();
    let key = parts.next().unwrap_or_default();

    let entry = match registry().resolve_root_prefix(prefix) {
        Ok(entry) => entry,
        Err(err) => {
            // Unsupported prefix is a domain error, not a degraded-mode
            // situation; the caller gets a placeholder carrying the error
            // text so the crawl can still report *something* for this root.
            tracing::error!(root_id, error = %err, "unsupported root identifier prefix");
            return Resource::placeholder_as(
                "unknown",
                root_id,
                format!("Unsupported root identifier prefix: {err}"),
                is_root,
            );
        }
    };

    match fetch_typed_root(client, entry.type_tag, key, is_root).await {
        Ok(resource) => resource,
        Err(err) => {
            tracing::warn!(root_id, error = %err, "root fetch failed, synthesizing placeholder");
            Resource::placeholder_as(
                entry.type_tag,
                root_id,
                format!(
                    "Unable to fetch {} from API: {}",
                    title_case(entry.type_tag),
                    err
                ),
                is_root,
            )
        }
    }
}

async fn fetch_typed_root(
    client: &dyn ApiClient,
    type_tag: &'static str,
    key: &str,
    is_root: bool,
) -> ApiResult<Resource> {
    let item = client.fetch_root(type_tag, key).await?;
    Ok(registry().construct(type_tag, item.data, is_root, item.metadata))
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_a_registry_error() {
        let reg = registry();
        assert!(matches!(
            reg.get("no-such-type"),
            Err(RegistryError::UnknownType { .. })
        ));
    }

    #[test]
    fn known_types_are_registered() {
        let reg = registry();
        assert!(reg.contains("organization"));
        assert!(reg.contains("project"));
        assert!(reg.contains("folder"));
    }
}

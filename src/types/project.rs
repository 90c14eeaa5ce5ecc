//! `project`: root-fetchable, dispatchable, `iam_policy`/`billing_info`/
//! `enabled_apis`, with the `enumerable`/`billing_enabled`/
//! `is_api_enabled` predicates gating its children (§4.G, SPEC_FULL §10).

use std::sync::Arc;

use serde_json::Value;

use crate::iterator::SimpleIterator;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;
use crate::resource::Resource;

/// `lifecycleState == "ACTIVE"`.
pub fn enumerable(resource: &Resource) -> bool {
    resource.data().get("lifecycleState").and_then(Value::as_str) == Some("ACTIVE")
}

/// Reads the cached `billing_info`; unknown or null collapses to `true` so
/// a project whose billing hasn't been checked yet isn't over-gated.
pub fn billing_enabled(resource: &Resource) -> bool {
    match resource.cached_side_band("billing_info") {
        Some(Value::Object(map)) => map
            .get("billingEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        Some(Value::Bool(enabled)) => enabled,
        _ => true,
    }
}

/// Checks the membership set populated by `get_enabled_apis`; an empty or
/// not-yet-fetched set collapses to `true`.
pub fn is_api_enabled(resource: &Resource, api_name: &str) -> bool {
    match resource.cached_side_band("enabled_apis") {
        Some(Value::Array(apis)) if !apis.is_empty() => {
            apis.iter().any(|v| v.as_str() == Some(api_name))
        }
        _ => true,
    }
}

fn compute_enabled(resource: &Resource) -> bool {
    enumerable(resource) && is_api_enabled(resource, "compute.googleapis.com")
}

fn storage_enabled(resource: &Resource) -> bool {
    enumerable(resource) && is_api_enabled(resource, "storage.googleapis.com")
}

fn bigquery_enabled(resource: &Resource) -> bool {
    enumerable(resource) && is_api_enabled(resource, "bigquery.googleapis.com")
}

fn container_enabled(resource: &Resource) -> bool {
    enumerable(resource) && is_api_enabled(resource, "container.googleapis.com")
}

fn dataproc_enabled(resource: &Resource) -> bool {
    enumerable(resource) && is_api_enabled(resource, "dataproc.googleapis.com")
}

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("project", KeyStrategy::Field { field: "projectId" })
        .root_prefix("projects")
        .dispatchable(true)
        .with_children(vec![
            Arc::new(
                SimpleIterator::new("iter_compute_instances", "compute_instance", vec!["projectId"])
                    .with_predicate(compute_enabled),
            ),
            Arc::new(
                SimpleIterator::new("iter_buckets", "bucket", vec!["projectId"])
                    .with_predicate(storage_enabled),
            ),
            Arc::new(
                SimpleIterator::new("iter_bigquery_datasets", "bigquery_dataset", vec!["projectId"])
                    .with_predicate(bigquery_enabled),
            ),
            Arc::new(
                SimpleIterator::new("iter_kubernetes_clusters", "kubernetes_cluster", vec!["projectId"])
                    .with_predicate(container_enabled),
            ),
            Arc::new(
                SimpleIterator::new("iter_dataproc_clusters", "dataproc_cluster", vec!["projectId"])
                    .with_predicate(dataproc_enabled),
            ),
        ])
}

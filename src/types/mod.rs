//! Per-type registrations (component G). See spec §4.G and SPEC_FULL §10.
//!
//! Each submodule contributes one [`RegistryEntry`](crate::registry::RegistryEntry)
//! plus whatever bespoke helpers its overrides need (key derivation is
//! declarative and lives in the entry; fetch-argument derivation and
//! predicates are the bespoke part, and live here).

mod bigquery_dataset;
mod bucket;
mod compute_instance;
mod curated_role;
mod dataproc_cluster;
mod folder;
mod gcs_object;
mod group;
mod kubernetes_cluster;
mod kubernetes_workload;
mod organization;
mod project;

use crate::registry::RegistryBuilder;

pub fn build_registry() -> RegistryBuilder {
    RegistryBuilder::new()
        .register(organization::entry())
        .register(folder::entry())
        .register(project::entry())
        .register(compute_instance::entry())
        .register(bucket::entry())
        .register(gcs_object::entry())
        .register(bigquery_dataset::entry())
        .register(kubernetes_cluster::entry())
        .register(kubernetes_workload::entry())
        .register(dataproc_cluster::entry())
        .register(group::entry())
        .register(group::member_entry())
        .register(curated_role::entry())
        .register(composite_root_entry())
}

/// The synthetic composite root's iterator (§6, SPEC_FULL §10): fetches
/// each configured child id through the ordinary prefix-dispatch path and
/// yields it as a non-root sub-root.
struct CompositeRootChildren;

impl crate::iterator::ChildIterator for CompositeRootChildren {
    fn iterate<'a>(
        &'a self,
        parent: &'a crate::resource::Resource,
        client: &'a dyn crate::client::ApiClient,
    ) -> futures::stream::BoxStream<'a, crate::resource::Resource> {
        use futures::stream::{self, StreamExt};

        let children: Vec<String> = parent
            .data()
            .get("composite_children")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        stream::iter(children)
            .then(move |root_id| async move { crate::registry::fetch_subroot(client, &root_id).await })
            .boxed()
    }
}

/// The synthetic composite root (§6, SPEC_FULL §10).
fn composite_root_entry() -> crate::registry::RegistryEntry {
    use crate::key::KeyStrategy;
    use std::sync::Arc;

    crate::registry::RegistryEntry::new("composite_root", KeyStrategy::Field { field: "name" })
        .with_children(vec![Arc::new(CompositeRootChildren)])
}

//! `kubernetes_workload`: the bespoke Composite iterator case (§4.C.2).
//! A workload needs its cluster's zone/location *and* its grandparent
//! project id — fields spread across two ancestor levels, so it can't be
//! expressed as a `SimpleIterator`.

use futures::stream::BoxStream;

use crate::client::ApiClient;
use crate::iterator::{run_listing, ChildIterator};
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;
use crate::resource::Resource;

use super::kubernetes_cluster;

struct WorkloadIterator;

impl ChildIterator for WorkloadIterator {
    fn iterate<'a>(
        &'a self,
        parent: &'a Resource,
        client: &'a dyn ApiClient,
    ) -> BoxStream<'a, Resource> {
        let project_id = parent
            .parent()
            .map(|project| project.key().to_string())
            .unwrap_or_default();
        let zone = kubernetes_cluster::zone_from_self_link(parent).unwrap_or_default();

        let args = [
            ("projectId", project_id),
            ("zone", zone),
            ("cluster", parent.key().to_string()),
        ];
        let items = client.iter_children("iter_kubernetes_workloads", &args);
        run_listing(parent, "kubernetes_workload", items)
    }
}

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("kubernetes_workload", KeyStrategy::KubeUid)
}

pub(super) fn iterator_for_cluster() -> std::sync::Arc<dyn ChildIterator> {
    std::sync::Arc::new(WorkloadIterator)
}

//! `dataproc_cluster`: field-keyed, with an `iam_policy` override that
//! reads a region out of a label map before fetching; a missing label is
//! downgraded to a warning rather than failing the fetch (§4.G).

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::client::ApiClient;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;
use crate::resource::Resource;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("dataproc_cluster", KeyStrategy::Field { field: "clusterName" })
        .with_side_band_override("iam_policy", iam_policy_override)
}

/// Registry-table shim: `SideBandFetcher` needs a plain fn pointer to a
/// boxed future, which an `async fn` doesn't coerce to directly.
fn iam_policy_override<'a>(resource: &'a Resource, client: &'a dyn ApiClient) -> BoxFuture<'a, Option<Value>> {
    iam_policy(resource, client).boxed()
}

/// `get_iam_policy(client)` override: the API call needs a region, which
/// for Dataproc isn't on the cluster's own top-level fields but nested in
/// its label map under `"region"`.
pub async fn iam_policy(resource: &Resource, client: &dyn ApiClient) -> Option<Value> {
    let region = resource
        .data()
        .get("labels")
        .and_then(|labels| labels.get("region"))
        .and_then(Value::as_str);

    let args: Vec<(&str, String)> = match region {
        Some(region) => vec![("region", region.to_string())],
        None => {
            resource.add_warning(format!(
                "dataproc cluster {} has no region label; fetching iam_policy without one",
                resource.repr()
            ));
            Vec::new()
        }
    };

    resource.fetch_side_band("iam_policy", client, &args).await
}

//! The narrow interface the core consumes from the (out-of-scope) concrete
//! cloud API client. Production implementations (HTTP, auth, paging, quota)
//! live outside this crate; tests exercise the core against a hand-written
//! fake (see `tests/common`).

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::ApiResult;

/// One API-returned entity plus its opaque side-channel metadata.
#[derive(Debug, Clone, Default)]
pub struct FetchedItem {
    pub data: Value,
    pub metadata: Value,
}

/// A lazily-produced sequence of child items. Paging is the client's
/// responsibility; the stream simply yields items until exhaustion.
pub type ItemStream = BoxStream<'static, ApiResult<FetchedItem>>;

/// The fat, per-kind interface the engine and iterators dispatch calls
/// through. Method names are semantic, not wire-exact, matching §6 of the
/// spec ("names are semantic, not wire-exact").
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch a single top-level entity (organization, folder, or project) by
    /// its root key.
    async fn fetch_root(&self, kind: &str, key: &str) -> ApiResult<FetchedItem>;

    /// List children of `parent_key` for the named child kind. `args` carries
    /// whatever iterator-specific arguments the caller derived from the
    /// parent's data (e.g. project id, zone, cluster name).
    fn iter_children(
        &self,
        child_kind: &str,
        args: &[(&str, String)],
    ) -> ItemStream;

    /// Fetch a named side-band value (`iam_policy`, `org_policy`, ...) for a
    /// resource, identified by its type tag and key plus any extra args the
    /// fetch needs (e.g. a region label for Dataproc).
    async fn fetch_side_band(
        &self,
        side_band: &str,
        resource_type: &str,
        resource_key: &str,
        args: &[(&str, String)],
    ) -> ApiResult<Value>;
}

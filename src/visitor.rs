//! The visitor interface consumed by the traversal engine. See spec §6.
//!
//! The visitor owns the sink, the dispatch pool, and the config; the
//! engine only ever calls through this trait, never touching those
//! collaborators directly (keeps `engine.rs` testable against a fake).

use async_trait::async_trait;

use crate::client::ApiClient;
use crate::config::CrawlConfig;
use crate::dispatch::DispatchPool;
use crate::resource::Resource;

/// Implemented by the crawl driver. `visit` persists the resource and may
/// query side-band fetches on it; `on_child_error` is one-way reporting,
/// never propagated back into the traversal.
#[async_trait]
pub trait Visitor: Send + Sync {
    async fn visit(&self, resource: &Resource);

    fn get_client(&self) -> &dyn ApiClient;

    fn dispatch_pool(&self) -> &DispatchPool;

    /// `full_resource_name` of the failing node, plus the error or
    /// accumulated-warning text describing what went wrong.
    fn on_child_error(&self, full_resource_name: &str, message: &str);

    fn config(&self) -> &CrawlConfig;
}

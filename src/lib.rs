//! Hierarchical cloud resource inventory crawler.
//!
//! The crate is the traversal core described in the architecture doc: a
//! process-wide type registry ([`registry`]), the crawled entity type
//! ([`resource`]), child iterators ([`iterator`]), the traversal engine
//! ([`engine`]), a bounded dispatch pool ([`dispatch`]), and the visitor
//! seam the driver implements ([`visitor`]). The concrete cloud API
//! client, storage sink, and progress reporting are intentionally out of
//! scope; callers implement [`client::ApiClient`] and [`visitor::Visitor`]
//! themselves.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod iterator;
pub mod key;
pub mod registry;
pub mod resource;
mod types;
pub mod visitor;

pub use client::{ApiClient, FetchedItem, ItemStream};
pub use config::{ConfigLoader, CrawlConfig};
pub use dispatch::DispatchPool;
pub use engine::{accept, composite_root, crawl, from_root_id};
pub use error::{ApiError, ConfigError, CrawlError, CrawlResult, RegistryError, StateError};
pub use registry::{registry, Registry, RegistryEntry};
pub use resource::Resource;
pub use visitor::Visitor;

//! Traversal engine (component D). See spec §4.D.
//!
//! One call services exactly one `Resource` and recursively services its
//! descendants. Dispatched children run through the visitor's pool;
//! inline children run on the caller's task. Both paths go through
//! `try_accept`, which isolates a panicking child so the parent's own
//! traversal is unaffected (§4.D step 6).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::StreamExt;
use serde_json::Value;

use crate::config::CrawlConfig;
use crate::client::ApiClient;
use crate::registry::{self, registry};
use crate::resource::Resource;
use crate::visitor::Visitor;

/// Mirrors `from_root_id(client, root_id, is_root=true)`: resolves the
/// root-id prefix and dispatches to the matching type's root fetch,
/// degrading to a placeholder on failure.
pub async fn from_root_id(client: &dyn ApiClient, root_id: &str) -> Resource {
    registry::fetch_root(client, root_id).await
}

/// Constructs the synthetic composite root described in §6: its iterator
/// (registered against the `"composite_root"` type tag) fetches each
/// listed child id and yields it as a non-root sub-root of the crawl.
pub fn composite_root(composite_children: Vec<String>) -> Resource {
    let data = serde_json::json!({
        "name": "Composite Root",
        "composite_children": composite_children,
    });
    registry().construct("composite_root", data, true, Value::Null)
}

/// Drives a full crawl: builds the root (or accepts one already built),
/// walks it, then drains the dispatch pool before returning. This is the
/// "terminal state" of §4.D: the root's `accept` has returned *and* all
/// dispatched callbacks have completed.
pub async fn crawl(root: Resource, visitor: Arc<dyn Visitor>) {
    accept(root, Arc::clone(&visitor), Vec::new()).await;
    visitor.dispatch_pool().join().await;
}

/// `true` if `resource` matches the visitor's exclusion set (§4.D step 2).
/// Projects additionally match on `"project/<projectNumber>"`.
fn is_excluded(resource: &Resource, config: &CrawlConfig) -> bool {
    if config.is_excluded(resource.type_tag(), resource.key()) {
        return true;
    }
    if resource.type_tag() == "project" {
        if let Some(number) = resource.data().get("projectNumber") {
            let number = match number {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if config.is_excluded("project", &number) {
                return true;
            }
        }
    }
    false
}

/// The state machine from §4.D: stack-bind, exclusion check, visit,
/// descend, finalize. Recursion through dispatched and inline children
/// both funnel back through this function, so it must be boxed ('static
/// lifetime: dispatched children are moved onto the pool's own tasks).
pub fn accept(
    resource: Resource,
    visitor: Arc<dyn Visitor>,
    incoming_stack: Vec<Resource>,
) -> BoxFuture<'static, ()> {
    async move {
        resource.bind_stack(incoming_stack);

        if is_excluded(&resource, visitor.config()) {
            return;
        }

        visitor.visit(&resource).await;

        let entry = registry()
            .get(resource.type_tag())
            .expect("registry lookup failed for a constructed resource");

        let client = visitor.get_client();
        let stack_for_children: Vec<Resource> = {
            let mut stack = resource
                .stack()
                .expect("stack() must succeed immediately after bind_stack")
                .to_vec();
            stack.push(resource.clone());
            stack
        };

        for iterator in &entry.child_iterators {
            let mut children = iterator.iterate(&resource, client);
            while let Some(child) = children.next().await {
                let new_stack = stack_for_children.clone();
                if child.should_dispatch() {
                    let visitor = Arc::clone(&visitor);
                    visitor
                        .dispatch_pool()
                        .dispatch(try_accept(child, visitor, new_stack));
                } else {
                    try_accept(child, Arc::clone(&visitor), new_stack).await;
                }
            }
        }

        // Finalize (§4.D step 7): flush accumulated warnings exactly once,
        // after descent, so enrichment/iteration warnings recorded above
        // are included.
        if resource.has_warnings() {
            visitor.on_child_error(resource.full_resource_name(), &resource.get_warning());
        }
    }
    .boxed()
}

/// §4.D step 6: the child's full `accept` wrapped in a catch-all. A panic
/// anywhere in the child's subtree is reported through
/// `visitor.on_child_error` and does not propagate to the parent.
fn try_accept(
    child: Resource,
    visitor: Arc<dyn Visitor>,
    stack: Vec<Resource>,
) -> BoxFuture<'static, ()> {
    async move {
        child.bind_stack(stack.clone());
        let full_name = child.full_resource_name().to_string();

        let visitor_for_panic = Arc::clone(&visitor);
        let outcome = AssertUnwindSafe(accept(child, visitor, stack))
            .catch_unwind()
            .await;

        if let Err(panic) = outcome {
            let message = panic_message(&panic);
            tracing::error!(resource = %full_name, error = %message, "child subtree panicked");
            visitor_for_panic.on_child_error(&full_name, &message);
        }
    }
    .boxed()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! `folder`: root-fetchable, dispatchable, `org_policy`/`iam_policy`,
//! folder/project children (SPEC_FULL §10).

use std::sync::Arc;

use crate::iterator::SimpleIterator;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("folder", KeyStrategy::Field { field: "name" })
        .root_prefix("folders")
        .dispatchable(true)
        .with_children(vec![
            Arc::new(SimpleIterator::new("iter_folders", "folder", vec!["name"])),
            Arc::new(SimpleIterator::new("iter_projects", "project", vec!["name"])),
        ])
}

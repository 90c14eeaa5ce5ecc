//! `organization`: root-fetchable, has `org_policy`/`iam_policy`, and
//! children spanning folders, projects, curated roles, and top-level
//! groups (SPEC_FULL §10).

use std::sync::Arc;

use crate::iterator::SimpleIterator;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("organization", KeyStrategy::Field { field: "organizationId" })
        .root_prefix("organizations")
        .with_children(vec![
            Arc::new(SimpleIterator::new("iter_folders", "folder", vec!["name"])),
            Arc::new(SimpleIterator::new("iter_projects", "project", vec!["name"])),
            Arc::new(SimpleIterator::new(
                "iter_curated_roles",
                "curated_role",
                vec!["name"],
            )),
            Arc::new(SimpleIterator::new("iter_groups", "group", vec!["name"])),
        ])
}

//! `group`: a root-unrelated top-level type, dispatchable, with
//! `group_members` exposed as a child iterator rather than a single fetch
//! (SPEC_FULL §10, "listed here for symmetry").

use std::sync::Arc;

use crate::iterator::SimpleIterator;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("group", KeyStrategy::Field { field: "name" })
        .dispatchable(true)
        .with_children(vec![Arc::new(SimpleIterator::new(
            "iter_group_members",
            "group_member",
            vec!["name"],
        ))])
}

pub fn member_entry() -> RegistryEntry {
    RegistryEntry::new("group_member", KeyStrategy::Field { field: "id" })
}

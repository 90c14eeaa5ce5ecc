//! `bucket`: hash-keyed on `selfLink`, `gcs_policy`, with `gcs_object`
//! children enriched per-item with ACL data (the Augmenting iterator
//! shape, §4.C.3).

use std::sync::Arc;

use crate::iterator::AugmentingIterator;
use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("bucket", KeyStrategy::HashField { field: "selfLink" }).with_children(vec![
        Arc::new(AugmentingIterator {
            api_method: "iter_gcs_objects",
            child_type: "gcs_object",
            arg_keys: vec!["name"],
            enrichment_side_band: "gcs_object_acl",
            enrichment_field: "acl",
        }),
    ])
}

//! `compute_instance`: field-keyed leaf with `iam_policy` (SPEC_FULL §10).

use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("compute_instance", KeyStrategy::Field { field: "name" })
}

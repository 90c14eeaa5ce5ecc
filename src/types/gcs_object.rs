//! `gcs_object`: composite-keyed on the owning bucket plus object name,
//! with `gcs_policy` (SPEC_FULL §10).

use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new(
        "gcs_object",
        KeyStrategy::Composite {
            constraint_field: "name",
        },
    )
}

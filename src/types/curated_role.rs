//! `curated_role`: organization-level custom IAM role. Has no parent
//! regardless of where it sits in the traversal stack (§4.G).

use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("curated_role", KeyStrategy::Field { field: "name" }).parentless()
}

//! `bigquery_dataset`: field-keyed on `id`, with paired `iam_policy`/
//! `dataset_policy` — the pairing itself is generic, keyed off the type
//! tag, in `resource.rs`'s `fetch_side_band` (SPEC_FULL §10).

use crate::key::KeyStrategy;
use crate::registry::RegistryEntry;

pub fn entry() -> RegistryEntry {
    RegistryEntry::new("bigquery_dataset", KeyStrategy::Field { field: "id" })
}

//! Metadata information regarding the database and tracked information.

pub mod database;

// re-export without modules
pub use database::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub collections: CollectionsInfo,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            collections: CollectionsInfo::empty(),
        }
    }

    /// Lookup a collection by the name it is exposed under.
    pub fn lookup_collection(&self, collection_name: &str) -> Option<&CollectionInfo> {
        self.collections.0.get(collection_name)
    }
}

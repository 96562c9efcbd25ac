//! The configuration the service runs with.

use std::collections::BTreeMap;

use query_engine_metadata::metadata;

use crate::values::{PaginationSettings, PoolSettings};

/// The 'Configuration' type collects all the information necessary to serve list requests at
/// runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves secrets and checks that every name the
/// configuration mentions refers to something that exists.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub endpoints: BTreeMap<String, Endpoint>,
    pub connection_uri: String,
    pub pool_settings: PoolSettings,
    pub pagination: PaginationSettings,
    pub consistent_snapshot: bool,
}

/// A list endpoint: the collection it lists and the relationships loaded with every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub collection: String,
    pub includes: Vec<String>,
}

impl Configuration {
    pub fn lookup_endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }
}

pub mod configuration;
pub mod environment;
pub mod error;
pub mod values;
pub mod version1;

pub use configuration::{Configuration, Endpoint};
pub use values::{ConnectionUri, PaginationSettings, PoolSettings, Secret};
pub use version1::{
    configuration_schema, make_runtime_configuration, parse_configuration, EndpointSettings,
    ParsedConfiguration,
};

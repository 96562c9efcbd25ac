//! The first version of the configuration file format.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use schemars::{schema::RootSchema, JsonSchema};
use serde::{Deserialize, Serialize};
use tokio::fs;

use query_engine_metadata::metadata;

use crate::configuration::{Configuration, Endpoint};
use crate::environment::Environment;
use crate::error::{MakeRuntimeConfigurationError, ParseConfigurationError};
use crate::values::{ConnectionUri, PaginationSettings, PoolSettings, Secret};

const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const DEFAULT_CONNECTION_URI_VARIABLE: &str = "FLEET_QUERY_DATABASE_URL";

/// The configuration file as it is written on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    /// Which version of the configuration format are we using
    pub version: u32,
    /// Connection string for a PostgreSQL database
    pub connection_uri: ConnectionUri,
    #[serde(skip_serializing_if = "PoolSettings::is_default")]
    #[serde(default)]
    pub pool_settings: PoolSettings,
    #[serde(skip_serializing_if = "PaginationSettings::is_default")]
    #[serde(default)]
    pub pagination: PaginationSettings,
    /// Count and fetch a page inside one read-only repeatable-read transaction, so the total
    /// always agrees with the page.
    #[serde(default)]
    pub consistent_snapshot: bool,
    #[serde(default)]
    pub metadata: metadata::Metadata,
    /// The list endpoints to expose, by name. When empty, every collection is exposed
    /// under its own name without includes.
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, EndpointSettings>,
}

/// A list endpoint as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    pub collection: String,
    /// Relationships loaded along with every record, by name.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
}

impl ParsedConfiguration {
    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            connection_uri: ConnectionUri(Secret::FromEnvironment {
                variable: DEFAULT_CONNECTION_URI_VARIABLE.into(),
            }),
            pool_settings: PoolSettings::default(),
            pagination: PaginationSettings::default(),
            consistent_snapshot: false,
            metadata: metadata::Metadata::default(),
            endpoints: BTreeMap::new(),
        }
    }
}

/// The JSON schema of the configuration file.
pub fn configuration_schema() -> RootSchema {
    schemars::schema_for!(ParsedConfiguration)
}

/// Read `configuration.json` from the given directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents =
        fs::read_to_string(&configuration_file)
            .await
            .map_err(|err| {
                ParseConfigurationError::IoErrorButStringified(format!(
                    "{}: {}",
                    &configuration_file.display(),
                    err
                ))
            })?;

    let parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion {
            found: parsed_config.version,
            expected: CURRENT_VERSION,
        });
    }

    if let ConnectionUri(Secret::Plain(uri)) = &parsed_config.connection_uri {
        if uri.is_empty() {
            return Err(ParseConfigurationError::EmptyConnectionUri {
                file_path: configuration_file,
            });
        }
    }

    Ok(parsed_config)
}

/// Resolve secrets and check every name the configuration refers to.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = match &parsed_config.connection_uri {
        ConnectionUri(Secret::Plain(uri)) => Cow::Borrowed(uri),
        ConnectionUri(Secret::FromEnvironment { variable }) => Cow::Owned(
            environment.read(variable).map_err(|error| {
                MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                    file_path: PathBuf::from(CONFIGURATION_FILENAME),
                    message: error.to_string(),
                }
            })?,
        ),
    }
    .into_owned();

    validate_pagination(&parsed_config.pagination)?;
    validate_metadata(&parsed_config.metadata)?;
    let endpoints = make_endpoints(&parsed_config.metadata, parsed_config.endpoints)?;

    Ok(Configuration {
        metadata: parsed_config.metadata,
        endpoints,
        connection_uri,
        pool_settings: parsed_config.pool_settings,
        pagination: parsed_config.pagination,
        consistent_snapshot: parsed_config.consistent_snapshot,
    })
}

fn validate_pagination(pagination: &PaginationSettings) -> Result<(), MakeRuntimeConfigurationError> {
    if pagination.default_rows == 0 {
        return Err(MakeRuntimeConfigurationError::InvalidPagination(
            "defaultRows must be positive".to_string(),
        ));
    }
    match pagination.max_rows {
        Some(max_rows) if max_rows < pagination.default_rows => {
            Err(MakeRuntimeConfigurationError::InvalidPagination(format!(
                "maxRows ({max_rows}) is smaller than defaultRows ({})",
                pagination.default_rows
            )))
        }
        _ => Ok(()),
    }
}

/// Every relationship must point at a known collection through known columns.
fn validate_metadata(metadata: &metadata::Metadata) -> Result<(), MakeRuntimeConfigurationError> {
    for (collection_name, collection) in &metadata.collections.0 {
        for key_column in &collection.primary_key {
            if collection.lookup_column(key_column).is_none() {
                return Err(MakeRuntimeConfigurationError::InvalidMetadata(format!(
                    "primary key of collection '{collection_name}': unknown column '{key_column}'"
                )));
            }
        }
        for (relationship_name, relationship) in &collection.relationships.0 {
            let invalid = |message: String| {
                MakeRuntimeConfigurationError::InvalidMetadata(format!(
                    "relationship '{relationship_name}' of collection '{collection_name}': {message}"
                ))
            };
            let target = metadata
                .lookup_collection(&relationship.target_collection)
                .ok_or_else(|| {
                    invalid(format!(
                        "unknown target collection '{}'",
                        relationship.target_collection
                    ))
                })?;
            if relationship.column_mapping.is_empty() {
                return Err(invalid("the column mapping is empty".to_string()));
            }
            for (source_column, target_column) in &relationship.column_mapping {
                if collection.lookup_column(source_column).is_none() {
                    return Err(invalid(format!("unknown source column '{source_column}'")));
                }
                if target.lookup_column(target_column).is_none() {
                    return Err(invalid(format!("unknown target column '{target_column}'")));
                }
            }
        }
    }
    Ok(())
}

fn make_endpoints(
    metadata: &metadata::Metadata,
    endpoints: BTreeMap<String, EndpointSettings>,
) -> Result<BTreeMap<String, Endpoint>, MakeRuntimeConfigurationError> {
    if endpoints.is_empty() {
        tracing::debug!("no endpoints configured, exposing every collection");
        return Ok(metadata
            .collections
            .0
            .keys()
            .map(|name| {
                (
                    name.clone(),
                    Endpoint {
                        collection: name.clone(),
                        includes: vec![],
                    },
                )
            })
            .collect());
    }

    endpoints
        .into_iter()
        .map(|(endpoint_name, settings)| {
            let collection = metadata.lookup_collection(&settings.collection).ok_or_else(|| {
                MakeRuntimeConfigurationError::InvalidEndpoint {
                    endpoint: endpoint_name.clone(),
                    message: format!("unknown collection '{}'", settings.collection),
                }
            })?;
            if let Some(include) = settings
                .includes
                .iter()
                .find(|include| collection.lookup_relationship(include).is_none())
            {
                return Err(MakeRuntimeConfigurationError::InvalidEndpoint {
                    endpoint: endpoint_name,
                    message: format!(
                        "unknown relationship '{include}' in collection '{}'",
                        settings.collection
                    ),
                });
            }
            Ok((
                endpoint_name,
                Endpoint {
                    collection: settings.collection,
                    includes: settings.includes,
                },
            ))
        })
        .collect()
}

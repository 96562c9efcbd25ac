//! Metadata information regarding the database and tracked information.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types supported by the Engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    #[serde(rename = "double precision")]
    DoublePrecision,
    Numeric,
    Character,
    #[serde(rename = "character varying")]
    CharacterVarying,
    Text,
    Date,
    #[serde(rename = "timestamp with time zone")]
    TimestampWithTimeZone,
    #[serde(rename = "timestamp without time zone")]
    TimestampWithoutTimeZone,
    Uuid,
    Any,
}

impl ScalarType {
    /// The name of the type as PostgreSQL spells it. `Any` has no name: values
    /// compared against such columns are sent as text and left uncast.
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            ScalarType::Boolean => Some("boolean"),
            ScalarType::Smallint => Some("smallint"),
            ScalarType::Integer => Some("integer"),
            ScalarType::Bigint => Some("bigint"),
            ScalarType::Real => Some("real"),
            ScalarType::DoublePrecision => Some("double precision"),
            ScalarType::Numeric => Some("numeric"),
            ScalarType::Character => Some("character"),
            ScalarType::CharacterVarying => Some("character varying"),
            ScalarType::Text => Some("text"),
            ScalarType::Date => Some("date"),
            ScalarType::TimestampWithTimeZone => Some("timestamp with time zone"),
            ScalarType::TimestampWithoutTimeZone => Some("timestamp without time zone"),
            ScalarType::Uuid => Some("uuid"),
            ScalarType::Any => None,
        }
    }

    /// Pattern operators can be applied to these without a cast to text.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            ScalarType::Character | ScalarType::CharacterVarying | ScalarType::Text
        )
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.type_name().unwrap_or("any"))
    }
}

/// Mapping from a collection name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CollectionsInfo(pub BTreeMap<String, CollectionInfo>);

impl CollectionsInfo {
    pub fn empty() -> Self {
        CollectionsInfo(BTreeMap::new())
    }
}

/// Information about a database table (or any other kind of relation) that can be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub schema_name: String,
    pub table_name: String,
    pub columns: BTreeMap<String, ColumnInfo>,
    /// Columns that identify a record. Sorted lists order by them after the sort key, so
    /// pages do not overlap when sort keys tie.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub relationships: Relationships,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CollectionInfo {
    pub fn lookup_column(&self, field: &str) -> Option<&ColumnInfo> {
        self.columns.get(field)
    }

    pub fn lookup_relationship(&self, relationship_name: &str) -> Option<&Relationship> {
        self.relationships.0.get(relationship_name)
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: Nullable,
}

/// A mapping from a relationship name (as used in request parameters) to its definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Relationships(pub BTreeMap<String, Relationship>);

/// A one-level link from one collection to another.
///
/// `column_mapping` maps columns of the source collection to columns of the target
/// collection, so a belongs-to link (`{"marque_id": "id"}`) and a has-many link
/// (`{"id": "marque_id"}`) are described the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub target_collection: String,
    pub column_mapping: BTreeMap<String, String>,
}

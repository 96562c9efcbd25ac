//! Resolve a list request against the metadata.
//!
//! A `ListPlan` only refers to collections, relationships and columns that exist, each with
//! its type. Every data source evaluates the same plan.

pub mod dates;
pub mod predicate;

use query_engine_metadata::metadata;

use crate::translation::error::Error;
use crate::translation::request::{
    FilterOperator, ListRequest, PageSpec, SortDirection, SortSpec,
};
pub use dates::{parse_date, DateLiteral};
pub use predicate::{ComparisonOperator, Predicate};

/// What is listed before any request parameter applies: a collection, and the relationships
/// loaded along with each of its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseQuery {
    pub collection: String,
    pub includes: Vec<String>,
}

/// A collection, by the name it is known under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub name: String,
    pub info: metadata::CollectionInfo,
}

/// A column, by the field name used in requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub field: String,
    pub info: metadata::ColumnInfo,
}

/// A relationship from the listed collection to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation {
    pub name: String,
    pub target: CollectionRef,
    /// Pairs of (source column, target column) that must be equal.
    pub column_mapping: Vec<(ResolvedColumn, ResolvedColumn)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterScope {
    Direct,
    /// Some related record must exist and satisfy the predicate.
    Relation(ResolvedRelation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub scope: FilterScope,
    pub column: ResolvedColumn,
    /// `None` when the operator is unknown or cannot take the value given.
    /// A relation filter without a predicate still requires a related record.
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortTarget {
    Column(ResolvedColumn),
    /// The column of the first related record.
    Relation {
        relation: ResolvedRelation,
        column: ResolvedColumn,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSort {
    pub target: SortTarget,
    pub direction: SortDirection,
    /// Primary key columns of the listed collection, ordered ascending after the target.
    pub tiebreak: Vec<ResolvedColumn>,
}

/// A list request, checked against the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub collection: CollectionRef,
    pub filters: Vec<ResolvedFilter>,
    pub sort: Option<ResolvedSort>,
    pub includes: Vec<ResolvedRelation>,
    pub page: PageSpec,
}

/// Check every name in the request and the base query against the metadata.
pub fn resolve(
    metadata: &metadata::Metadata,
    base: &BaseQuery,
    request: ListRequest,
) -> Result<ListPlan, Error> {
    let collection = lookup_collection(metadata, &base.collection)?;

    let filters = request
        .filters
        .into_iter()
        .map(|filter| {
            let scope = match &filter.relation {
                None => FilterScope::Direct,
                Some(relation) => {
                    FilterScope::Relation(resolve_relation(metadata, &collection, relation)?)
                }
            };
            let column = match &scope {
                FilterScope::Direct => resolve_column(&collection, &filter.field)?,
                FilterScope::Relation(relation) => resolve_column(&relation.target, &filter.field)?,
            };
            let predicate = match &filter.operator {
                FilterOperator::Known(operator) => {
                    let predicate = Predicate::from_operator(*operator, &filter.value);
                    if predicate.is_none() {
                        tracing::debug!(
                            field = filter.field.as_str(),
                            operator = operator.name(),
                            "operator does not take a list, ignoring"
                        );
                    }
                    predicate
                }
                FilterOperator::Unknown(_) => None,
            };
            Ok(ResolvedFilter {
                scope,
                column,
                predicate,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let sort = request
        .sort
        .map(|sort| resolve_sort(metadata, &collection, sort))
        .transpose()?;

    let includes = base
        .includes
        .iter()
        .map(|include| {
            resolve_relation(metadata, &collection, include).map_err(|error| match error {
                Error::RelationshipNotFound(name, collection) => {
                    Error::IncludeNotFound(name, collection)
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(ListPlan {
        collection,
        filters,
        sort,
        includes,
        page: request.page,
    })
}

fn resolve_sort(
    metadata: &metadata::Metadata,
    collection: &CollectionRef,
    sort: SortSpec,
) -> Result<ResolvedSort, Error> {
    let target = match &sort.relation {
        None => SortTarget::Column(resolve_column(collection, &sort.field)?),
        Some(relation) => {
            let relation = resolve_relation(metadata, collection, relation)?;
            let column = resolve_column(&relation.target, &sort.field)?;
            SortTarget::Relation { relation, column }
        }
    };
    let tiebreak = collection
        .info
        .primary_key
        .iter()
        .map(|key_column| resolve_column(collection, key_column))
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(ResolvedSort {
        target,
        direction: sort.direction,
        tiebreak,
    })
}

fn lookup_collection(
    metadata: &metadata::Metadata,
    collection_name: &str,
) -> Result<CollectionRef, Error> {
    metadata
        .lookup_collection(collection_name)
        .map(|info| CollectionRef {
            name: collection_name.to_string(),
            info: info.clone(),
        })
        .ok_or_else(|| Error::CollectionNotFound(collection_name.to_string()))
}

fn resolve_column(collection: &CollectionRef, field: &str) -> Result<ResolvedColumn, Error> {
    collection
        .info
        .lookup_column(field)
        .map(|info| ResolvedColumn {
            field: field.to_string(),
            info: info.clone(),
        })
        .ok_or_else(|| {
            Error::ColumnNotFoundInCollection(field.to_string(), collection.name.clone())
        })
}

fn resolve_relation(
    metadata: &metadata::Metadata,
    source: &CollectionRef,
    relationship_name: &str,
) -> Result<ResolvedRelation, Error> {
    let relationship = source
        .info
        .lookup_relationship(relationship_name)
        .ok_or_else(|| {
            Error::RelationshipNotFound(relationship_name.to_string(), source.name.clone())
        })?;
    let target = lookup_collection(metadata, &relationship.target_collection)?;
    let column_mapping = relationship
        .column_mapping
        .iter()
        .map(|(source_column, target_column)| {
            Ok((
                resolve_column(source, source_column)?,
                resolve_column(&target, target_column)?,
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(ResolvedRelation {
        name: relationship_name.to_string(),
        target,
        column_mapping,
    })
}

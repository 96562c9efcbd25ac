//! Evaluate list plans over JSON records held in memory.
//!
//! Evaluation follows what PostgreSQL does with the SQL the same plan translates to:
//! comparisons with `null` never hold, patterns are case-insensitive, date operators
//! compare calendar dates, and ascending sorts put `null` last (descending, first).
//! Records without a sort keep the order they were given in.

pub mod like;
pub mod scalar;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;

use query_engine_metadata::metadata::ScalarType;
use query_engine_translation::translation::plan::{
    ComparisonOperator, CollectionRef, DateLiteral, FilterScope, ListPlan, Predicate,
    ResolvedFilter, ResolvedRelation, ResolvedSort, SortTarget,
};
use query_engine_translation::translation::request::SortDirection;

use crate::error::{Error, QueryError};
use crate::query::{DataSource, QueryResult, Record};
use scalar::Scalar;

/// Records of each collection, by collection name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    collections: BTreeMap<String, Vec<Record>>,
}

impl InMemoryDataSource {
    pub fn new(collections: BTreeMap<String, Vec<Record>>) -> Self {
        Self { collections }
    }

    /// Read a dataset shaped as `{ "<collection>": [ { "<column>": value, ... } ] }`.
    pub fn from_json(dataset: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_value(dataset)?))
    }

    fn records(&self, collection: &CollectionRef) -> &[Record] {
        self.collections
            .get(&collection.name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Run a plan. The total is taken before the page is cut.
    pub fn evaluate(&self, plan: &ListPlan) -> Result<QueryResult, QueryError> {
        let mut matching = vec![];
        for record in self.records(&plan.collection) {
            if self.satisfies_all(record, &plan.filters)? {
                matching.push(record);
            }
        }
        let total_count = u64::try_from(matching.len()).unwrap_or(u64::MAX);

        if let Some(sort) = &plan.sort {
            let mut keyed = matching
                .into_iter()
                .map(|record| Ok((self.sort_key(record, sort)?, record)))
                .collect::<Result<Vec<_>, QueryError>>()?;
            keyed.sort_by(|(left, _), (right, _)| compare_sort_rows(left, right, sort.direction));
            matching = keyed.into_iter().map(|(_, record)| record).collect();
        }

        let offset = usize::try_from(plan.page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.page.limit).unwrap_or(usize::MAX);
        let rows = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| self.with_includes(record, &plan.includes))
            .collect();

        Ok(QueryResult { rows, total_count })
    }

    fn satisfies_all(
        &self,
        record: &Record,
        filters: &[ResolvedFilter],
    ) -> Result<bool, QueryError> {
        for filter in filters {
            if !self.satisfies(record, filter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn satisfies(&self, record: &Record, filter: &ResolvedFilter) -> Result<bool, QueryError> {
        let column = &filter.column.info;
        match &filter.scope {
            FilterScope::Direct => match &filter.predicate {
                None => Ok(true),
                Some(predicate) => {
                    evaluate_predicate(field(record, &column.name), column.r#type, predicate)
                }
            },
            FilterScope::Relation(relation) => {
                for related in self.related(record, relation) {
                    let holds = match &filter.predicate {
                        None => true,
                        Some(predicate) => evaluate_predicate(
                            field(related, &column.name),
                            column.r#type,
                            predicate,
                        )?,
                    };
                    if holds {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Records of the target collection whose mapped columns equal those of `record`.
    fn related<'a>(
        &'a self,
        record: &'a Record,
        relation: &'a ResolvedRelation,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.records(&relation.target).iter().filter(move |target| {
            relation
                .column_mapping
                .iter()
                .all(|(source_column, target_column)| {
                    keys_equal(
                        field(record, &source_column.info.name),
                        field(target, &target_column.info.name),
                    )
                })
        })
    }

    /// The sort target, then every primary key column.
    fn sort_key(
        &self,
        record: &Record,
        sort: &ResolvedSort,
    ) -> Result<Vec<Option<Scalar>>, QueryError> {
        let mut key = vec![self.sort_target(record, sort)?];
        for column in &sort.tiebreak {
            key.push(Scalar::from_json(
                field(record, &column.info.name),
                column.info.r#type,
            )?);
        }
        Ok(key)
    }

    fn sort_target(
        &self,
        record: &Record,
        sort: &ResolvedSort,
    ) -> Result<Option<Scalar>, QueryError> {
        match &sort.target {
            SortTarget::Column(column) => {
                Scalar::from_json(field(record, &column.info.name), column.info.r#type)
            }
            SortTarget::Relation { relation, column } => {
                match self.related(record, relation).next() {
                    None => Ok(None),
                    Some(related) => {
                        Scalar::from_json(field(related, &column.info.name), column.info.r#type)
                    }
                }
            }
        }
    }

    /// The record, with the first related record of every include nested under the
    /// relationship name, or `null`.
    fn with_includes(&self, record: &Record, includes: &[ResolvedRelation]) -> Record {
        let mut result = record.clone();
        for relation in includes {
            let related = self
                .related(record, relation)
                .next()
                .map_or(serde_json::Value::Null, |related| {
                    serde_json::Value::Object(related.clone())
                });
            result.insert(relation.name.clone(), related);
        }
        result
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn execute(&self, plan: &ListPlan) -> Result<QueryResult, Error> {
        Ok(self.evaluate(plan)?)
    }
}

static NULL: serde_json::Value = serde_json::Value::Null;

/// A missing column reads as `null`.
fn field<'a>(record: &'a Record, column: &str) -> &'a serde_json::Value {
    record.get(column).unwrap_or(&NULL)
}

/// Join keys match when neither is null and both read the same, so `1` matches `"1"`.
fn keys_equal(left: &serde_json::Value, right: &serde_json::Value) -> bool {
    !left.is_null() && !right.is_null() && scalar::json_text(left) == scalar::json_text(right)
}

fn evaluate_predicate(
    value: &serde_json::Value,
    scalar_type: ScalarType,
    predicate: &Predicate,
) -> Result<bool, QueryError> {
    match predicate {
        Predicate::Like { pattern, negated } => Ok(scalar::text_of(value, scalar_type)?
            .is_some_and(|text| like::ilike(&text, pattern) != *negated)),
        Predicate::Compare {
            operator,
            value: requested,
        } => {
            let requested = Scalar::parse(requested, scalar_type)?;
            Ok(Scalar::from_json(value, scalar_type)?
                .is_some_and(|actual| holds(*operator, actual.compare(&requested))))
        }
        Predicate::InList { values, negated } if values.is_empty() => Ok(*negated),
        Predicate::InList { values, negated } => {
            let values = values
                .iter()
                .map(|value| Scalar::parse(value, scalar_type))
                .collect::<Result<Vec<_>, QueryError>>()?;
            Ok(Scalar::from_json(value, scalar_type)?.is_some_and(|actual| {
                values
                    .iter()
                    .any(|value| actual.compare(value) == Some(Ordering::Equal))
                    != *negated
            }))
        }
        Predicate::Date { operator, date } => match Scalar::from_json(value, scalar_type)? {
            None => Ok(false),
            Some(actual) => Ok(holds(*operator, Some(actual.date()?.cmp(&date.0)))),
        },
    }
}

fn holds(operator: ComparisonOperator, ordering: Option<Ordering>) -> bool {
    match operator {
        ComparisonOperator::Equal => ordering.is_some_and(Ordering::is_eq),
        ComparisonOperator::NotEqual => ordering.is_some_and(Ordering::is_ne),
        ComparisonOperator::LessThan => ordering.is_some_and(Ordering::is_lt),
        ComparisonOperator::LessThanOrEqual => ordering.is_some_and(Ordering::is_le),
        ComparisonOperator::GreaterThan => ordering.is_some_and(Ordering::is_gt),
        ComparisonOperator::GreaterThanOrEqual => ordering.is_some_and(Ordering::is_ge),
    }
}

/// The first key in the requested direction, the primary key columns after it ascending.
fn compare_sort_rows(
    left: &[Option<Scalar>],
    right: &[Option<Scalar>],
    direction: SortDirection,
) -> Ordering {
    left.iter()
        .zip(right)
        .enumerate()
        .map(|(index, (left, right))| {
            let direction = if index == 0 {
                direction
            } else {
                SortDirection::Asc
            };
            compare_sort_keys(left.as_ref(), right.as_ref(), direction)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Ascending puts `null` last; descending is the exact reverse, so `null` comes first.
fn compare_sort_keys(
    left: Option<&Scalar>,
    right: Option<&Scalar>,
    direction: SortDirection,
) -> Ordering {
    let ascending = match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => left.compare(right).unwrap_or(Ordering::Equal),
    };
    match direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

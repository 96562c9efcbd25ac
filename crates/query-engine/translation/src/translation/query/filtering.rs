//! Handle filtering/where clauses translation.

use query_engine_metadata::metadata::database;
use query_engine_sql::sql;

use super::{from_collection, relationships, values};
use crate::translation::helpers::State;
use crate::translation::plan::{ComparisonOperator, FilterScope, Predicate, ResolvedFilter};

/// Translate all filters of a plan into a single expression. Filters are ANDed in order;
/// no filters at all is `true`.
pub fn translate_filters(
    state: &mut State,
    root_alias: &sql::ast::TableAlias,
    filters: &[ResolvedFilter],
) -> sql::ast::Expression {
    sql::helpers::and_all(
        filters
            .iter()
            .filter_map(|filter| translate_filter(state, root_alias, filter))
            .collect(),
    )
}

fn translate_filter(
    state: &mut State,
    root_alias: &sql::ast::TableAlias,
    filter: &ResolvedFilter,
) -> Option<sql::ast::Expression> {
    match &filter.scope {
        FilterScope::Direct => filter.predicate.as_ref().map(|predicate| {
            translate_predicate(
                sql::helpers::aliased_column(root_alias, &filter.column.info.name),
                filter.column.info.r#type,
                predicate,
            )
        }),
        FilterScope::Relation(relation) => {
            let target_alias = state.make_table_alias(relation.target.info.table_name.clone());
            let mut conditions = vec![relationships::translate_column_mapping(
                root_alias,
                &target_alias,
                relation,
            )];
            if let Some(predicate) = &filter.predicate {
                conditions.push(translate_predicate(
                    sql::helpers::aliased_column(&target_alias, &filter.column.info.name),
                    filter.column.info.r#type,
                    predicate,
                ));
            }
            Some(sql::helpers::exists(
                from_collection(&relation.target.info, target_alias),
                sql::helpers::and_all(conditions),
            ))
        }
    }
}

/// Translate a predicate on a column.
pub fn translate_predicate(
    column: sql::ast::Expression,
    scalar_type: database::ScalarType,
    predicate: &Predicate,
) -> sql::ast::Expression {
    match predicate {
        Predicate::Like { pattern, negated } => {
            let left = if scalar_type.is_textual() {
                column
            } else {
                values::cast(column, "text")
            };
            sql::ast::Expression::BinaryOperation {
                left: Box::new(left),
                operator: if *negated {
                    sql::ast::BinaryOperator::NotCaseInsensitiveLike
                } else {
                    sql::ast::BinaryOperator::CaseInsensitiveLike
                },
                right: Box::new(sql::ast::Expression::Value(sql::ast::Value::String(
                    pattern.clone(),
                ))),
            }
        }
        Predicate::Compare { operator, value } => sql::ast::Expression::BinaryOperation {
            left: Box::new(column),
            operator: translate_comparison_operator(*operator),
            right: Box::new(values::translate_value(value, scalar_type)),
        },
        Predicate::InList { values, negated } if values.is_empty() => {
            if *negated {
                sql::helpers::true_expr()
            } else {
                sql::helpers::false_expr()
            }
        }
        Predicate::InList {
            values: list,
            negated,
        } => sql::ast::Expression::BinaryArrayOperation {
            left: Box::new(column),
            operator: if *negated {
                sql::ast::BinaryArrayOperator::NotIn
            } else {
                sql::ast::BinaryArrayOperator::In
            },
            right: list
                .iter()
                .map(|value| values::translate_value(value, scalar_type))
                .collect(),
        },
        Predicate::Date { operator, date } => sql::ast::Expression::BinaryOperation {
            left: Box::new(values::cast(column, "date")),
            operator: translate_comparison_operator(*operator),
            right: Box::new(values::cast(
                sql::ast::Expression::Value(sql::ast::Value::String(date.to_sql_string())),
                "date",
            )),
        },
    }
}

fn translate_comparison_operator(operator: ComparisonOperator) -> sql::ast::BinaryOperator {
    match operator {
        ComparisonOperator::Equal => sql::ast::BinaryOperator::Equals,
        ComparisonOperator::NotEqual => sql::ast::BinaryOperator::NotEquals,
        ComparisonOperator::LessThan => sql::ast::BinaryOperator::LessThan,
        ComparisonOperator::LessThanOrEqual => sql::ast::BinaryOperator::LessThanOrEqualTo,
        ComparisonOperator::GreaterThan => sql::ast::BinaryOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual => sql::ast::BinaryOperator::GreaterThanOrEqualTo,
    }
}

//! Handle stuff related to relationships: existence checks, correlated subqueries, includes.

use query_engine_sql::sql;

use super::from_collection;
use crate::translation::helpers::State;
use crate::translation::plan::ResolvedRelation;

/// Given a relationship, the condition relating a source record to its target records.
pub fn translate_column_mapping(
    source_alias: &sql::ast::TableAlias,
    target_alias: &sql::ast::TableAlias,
    relation: &ResolvedRelation,
) -> sql::ast::Expression {
    sql::helpers::and_all(
        relation
            .column_mapping
            .iter()
            .map(|(source_column, target_column)| sql::ast::Expression::BinaryOperation {
                left: Box::new(sql::helpers::aliased_column(
                    source_alias,
                    &source_column.info.name,
                )),
                operator: sql::ast::BinaryOperator::Equals,
                right: Box::new(sql::helpers::aliased_column(
                    target_alias,
                    &target_column.info.name,
                )),
            })
            .collect(),
    )
}

/// Select from the target of a relationship, restricted to the records related to the
/// source record. The select list is built from the alias given to the target.
pub fn select_related(
    state: &mut State,
    source_alias: &sql::ast::TableAlias,
    relation: &ResolvedRelation,
    select_list: impl FnOnce(&sql::ast::TableAlias) -> Vec<(sql::ast::ColumnAlias, sql::ast::Expression)>,
) -> sql::ast::Select {
    let target_alias = state.make_table_alias(relation.target.info.table_name.clone());
    let mut select = sql::helpers::simple_select(select_list(&target_alias));
    select.where_ = sql::ast::Where(translate_column_mapping(
        source_alias,
        &target_alias,
        relation,
    ));
    select.from = Some(from_collection(&relation.target.info, target_alias));
    select
}

/// `(SELECT row_to_json(target) ... LIMIT 1) AS "<relationship>"` for every included
/// relationship. A record without a related record gets `null`.
pub fn translate_includes(
    state: &mut State,
    source_alias: &sql::ast::TableAlias,
    includes: &[ResolvedRelation],
) -> Vec<(sql::ast::ColumnAlias, sql::ast::Expression)> {
    includes
        .iter()
        .map(|relation| {
            let column_alias = sql::helpers::make_column_alias(relation.name.clone());
            let mut select = select_related(state, source_alias, relation, |target_alias| {
                vec![(
                    column_alias.clone(),
                    sql::ast::Expression::RowToJson(sql::ast::TableReference::AliasedTable(
                        target_alias.clone(),
                    )),
                )]
            });
            select.limit = sql::ast::Limit {
                limit: Some(1),
                offset: None,
            };
            (
                column_alias,
                sql::ast::Expression::CorrelatedSubSelect(Box::new(select)),
            )
        })
        .collect()
}

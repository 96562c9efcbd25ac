//! Handle the ORDER BY clause.

use query_engine_sql::sql;

use super::relationships;
use crate::translation::helpers::State;
use crate::translation::plan::{ResolvedSort, SortTarget};
use crate::translation::request::SortDirection;

/// Convert the sort of a plan to a SQL ORDER BY clause. Sorting by a column of a related
/// collection orders by a correlated subquery selecting that column from the first related
/// record. The primary key of the listed collection follows, ascending.
pub fn translate_sort(
    state: &mut State,
    root_alias: &sql::ast::TableAlias,
    sort: Option<&ResolvedSort>,
) -> sql::ast::OrderBy {
    let Some(sort) = sort else {
        return sql::helpers::empty_order_by();
    };

    let target = match &sort.target {
        SortTarget::Column(column) => sql::helpers::aliased_column(root_alias, &column.info.name),
        SortTarget::Relation { relation, column } => {
            let mut select = relationships::select_related(state, root_alias, relation, |target_alias| {
                vec![sql::helpers::make_column(
                    sql::ast::TableReference::AliasedTable(target_alias.clone()),
                    sql::ast::ColumnName(column.info.name.clone()),
                    sql::helpers::make_column_alias(column.field.clone()),
                )]
            });
            select.limit = sql::ast::Limit {
                limit: Some(1),
                offset: None,
            };
            sql::ast::Expression::CorrelatedSubSelect(Box::new(select))
        }
    };

    let direction = match sort.direction {
        SortDirection::Asc => sql::ast::OrderByDirection::Asc,
        SortDirection::Desc => sql::ast::OrderByDirection::Desc,
    };

    let mut elements = vec![sql::ast::OrderByElement { target, direction }];
    elements.extend(sort.tiebreak.iter().map(|column| sql::ast::OrderByElement {
        target: sql::helpers::aliased_column(root_alias, &column.info.name),
        direction: sql::ast::OrderByDirection::Asc,
    }));
    sql::ast::OrderBy { elements }
}

//! Translate a `ListPlan` into the SQL statements that answer it.

pub mod filtering;
pub mod relationships;
pub mod sorting;
pub mod values;

use query_engine_metadata::metadata;
use query_engine_sql::sql;

use crate::translation::helpers::State;
use crate::translation::plan::ListPlan;

/// The column holding each record in the rows statement.
pub const ROW_COLUMN: &str = "row";
/// The column holding the total in the count statement.
pub const TOTAL_COLUMN: &str = "totalRecords";

/// Translate a plan to an ExecutionPlan (SQL) to be run against the database.
///
/// Both statements share the same filters. The count statement is not paginated.
pub fn translate(plan: &ListPlan) -> sql::execution_plan::ExecutionPlan {
    let mut state = State::new();
    let root_alias = state.make_table_alias(plan.collection.info.table_name.clone());

    let predicate = filtering::translate_filters(&mut state, &root_alias, &plan.filters);
    let order_by = sorting::translate_sort(&mut state, &root_alias, plan.sort.as_ref());
    let include_columns =
        relationships::translate_includes(&mut state, &root_alias, &plan.includes);

    let from = from_collection(&plan.collection.info, root_alias.clone());

    let mut count = sql::helpers::simple_select(vec![(
        sql::helpers::make_column_alias(TOTAL_COLUMN.to_string()),
        sql::ast::Expression::Count(sql::ast::CountType::Star),
    )]);
    count.from = Some(from.clone());
    count.where_ = sql::ast::Where(predicate.clone());

    let mut row_columns = vec![(
        sql::helpers::make_column_alias(ROW_COLUMN.to_string()),
        sql::ast::Expression::RowToJson(sql::ast::TableReference::AliasedTable(root_alias)),
    )];
    row_columns.extend(include_columns);

    let mut rows = sql::helpers::simple_select(row_columns);
    rows.from = Some(from);
    rows.where_ = sql::ast::Where(predicate);
    rows.order_by = order_by;
    rows.limit = sql::ast::Limit {
        limit: Some(plan.page.limit),
        offset: Some(plan.page.offset),
    };

    tracing::debug!(count = ?count, rows = ?rows, "SQL AST");

    sql::execution_plan::ExecutionPlan {
        root_collection: plan.collection.name.clone(),
        count,
        rows,
        includes: plan
            .includes
            .iter()
            .map(|relation| relation.name.clone())
            .collect(),
    }
}

/// `FROM "schema"."table" AS <alias>`
pub fn from_collection(
    info: &metadata::CollectionInfo,
    alias: sql::ast::TableAlias,
) -> sql::ast::From {
    sql::ast::From::Table {
        reference: sql::ast::TableReference::DBTable {
            schema: sql::ast::SchemaName(info.schema_name.clone()),
            table: sql::ast::TableName(info.table_name.clone()),
        },
        alias,
    }
}

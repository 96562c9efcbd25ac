//! Describe the queries run against the database to answer one list request.

use super::ast;
use super::convert::select_to_sql;
use super::string;

/// Definition of an execution plan to be run against the database.
///
/// The total is counted before pagination is applied, so the two statements
/// share their filters but are otherwise independent.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub root_collection: String,
    /// Yields a single row with a single `totalRecords` column.
    pub count: ast::Select,
    /// Yields one row per record. The first column is the record as a JSON object,
    /// followed by one JSON column per included relationship.
    pub rows: ast::Select,
    /// The names of the included relationships, in the order of their columns.
    pub includes: Vec<String>,
}

impl ExecutionPlan {
    /// Extract the count statement as SQL.
    pub fn count_sql(&self) -> string::SQL {
        select_to_sql(&self.count)
    }

    /// Extract the rows statement as SQL.
    pub fn rows_sql(&self) -> string::SQL {
        select_to_sql(&self.rows)
    }

    /// Both statements, formatted for humans. Parameters are listed, not inlined.
    pub fn explain(&self) -> Explanation {
        let count = self.count_sql();
        let rows = self.rows_sql();
        Explanation {
            count: pretty(&count.sql),
            count_params: params_to_strings(count.params),
            rows: pretty(&rows.sql),
            rows_params: params_to_strings(rows.params),
        }
    }
}

/// A human readable rendition of an execution plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub count: String,
    pub count_params: Vec<String>,
    pub rows: String,
    pub rows_params: Vec<String>,
}

fn pretty(sql: &str) -> String {
    sqlformat::format(
        sql,
        &sqlformat::QueryParams::None,
        sqlformat::FormatOptions::default(),
    )
}

fn params_to_strings(params: Vec<string::Param>) -> Vec<String> {
    params
        .into_iter()
        .map(|param| match param {
            string::Param::String(s) => s,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::helpers;
    use super::*;

    #[test]
    fn explain_lists_params_of_each_statement_separately() {
        let mut count = helpers::simple_select(vec![(
            helpers::make_column_alias("totalRecords".to_string()),
            ast::Expression::Count(ast::CountType::Star),
        )]);
        count.where_ = ast::Where(ast::Expression::BinaryOperation {
            left: Box::new(ast::Expression::Value(ast::Value::String("a".to_string()))),
            operator: ast::BinaryOperator::Equals,
            right: Box::new(ast::Expression::Value(ast::Value::String("b".to_string()))),
        });
        let mut rows = count.clone();
        rows.limit = ast::Limit {
            limit: Some(10),
            offset: Some(0),
        };

        let plan = ExecutionPlan {
            root_collection: "things".to_string(),
            count,
            rows,
            includes: vec![],
        };
        let explanation = plan.explain();

        assert_eq!(explanation.count_params, vec!["a", "b"]);
        assert_eq!(explanation.rows_params, vec!["a", "b"]);
        assert!(explanation.rows.contains("LIMIT"));
        assert!(!explanation.count.contains("LIMIT"));
    }
}

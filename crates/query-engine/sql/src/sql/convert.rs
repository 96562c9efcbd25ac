//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::helpers;
use super::string::*;

/// Render a complete SELECT statement.
pub fn select_to_sql(select: &Select) -> SQL {
    let mut sql = SQL::new();
    select.to_sql(&mut sql);
    sql
}

// Convert to SQL strings

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            SelectList::SelectList(select_list) => {
                for (index, (col, expr)) in select_list.iter().enumerate() {
                    expr.to_sql(sql);
                    sql.append_syntax(" AS ");
                    col.to_sql(sql);
                    if index < (select_list.len() - 1) {
                        sql.append_syntax(", ");
                    }
                }
            }
            SelectList::Select1 => {
                sql.append_syntax("1");
            }
        }
    }
}

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        if let Some(from) = &self.from {
            sql.append_syntax(" ");
            from.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("FROM ");
        match &self {
            From::Table { reference, alias } => {
                reference.to_sql(sql);
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Where(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => value.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryArrayOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                {
                    left.to_sql(sql);
                    operator.to_sql(sql);
                    sql.append_syntax("(");
                    for (index, item) in right.iter().enumerate() {
                        item.to_sql(sql);
                        if index < (right.len() - 1) {
                            sql.append_syntax(", ");
                        }
                    }
                    sql.append_syntax(")");
                }
                sql.append_syntax(")");
            }
            Expression::Exists { select } => {
                sql.append_syntax("EXISTS ");
                sql.append_syntax("(");
                select.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::RowToJson(reference) => {
                sql.append_syntax("row_to_json");
                sql.append_syntax("(");
                reference.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Cast { expression, r#type } => {
                sql.append_syntax("CAST");
                sql.append_syntax("(");
                expression.to_sql(sql);
                sql.append_syntax(" AS ");
                r#type.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Count(count_type) => {
                sql.append_syntax("COUNT");
                sql.append_syntax("(");
                count_type.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::CorrelatedSubSelect(select) => {
                sql.append_syntax("(");
                select.to_sql(sql);
                sql.append_syntax(")");
            }
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            BinaryOperator::Equals => sql.append_syntax(" = "),
            BinaryOperator::NotEquals => sql.append_syntax(" <> "),
            BinaryOperator::LessThan => sql.append_syntax(" < "),
            BinaryOperator::LessThanOrEqualTo => sql.append_syntax(" <= "),
            BinaryOperator::GreaterThan => sql.append_syntax(" > "),
            BinaryOperator::GreaterThanOrEqualTo => sql.append_syntax(" >= "),
            BinaryOperator::CaseInsensitiveLike => sql.append_syntax(" ILIKE "),
            BinaryOperator::NotCaseInsensitiveLike => sql.append_syntax(" NOT ILIKE "),
        }
    }
}

impl BinaryArrayOperator {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            BinaryArrayOperator::In => sql.append_syntax(" IN "),
            BinaryArrayOperator::NotIn => sql.append_syntax(" NOT IN "),
        }
    }
}

impl CountType {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            CountType::Star => sql.append_syntax("*"),
        }
    }
}

impl Value {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Value::String(s) => sql.append_param(Param::String(s.clone())),
            Value::Bool(true) => sql.append_syntax("true"),
            Value::Bool(false) => sql.append_syntax("false"),
        }
    }
}

impl ScalarTypeName {
    pub fn to_sql(&self, sql: &mut SQL) {
        let ScalarTypeName(name) = self;
        sql.append_syntax(name);
    }
}

impl Limit {
    pub fn to_sql(&self, sql: &mut SQL) {
        if let Some(limit) = self.limit {
            sql.append_syntax(" LIMIT ");
            sql.append_syntax(format!("{limit}").as_str());
        }
        if let Some(offset) = self.offset {
            sql.append_syntax(" OFFSET ");
            sql.append_syntax(format!("{offset}").as_str());
        }
    }
}

// names
impl TableReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            TableReference::DBTable { schema, table } => {
                schema.to_sql(sql);
                sql.append_syntax(".");
                table.to_sql(sql);
            }
            TableReference::AliasedTable(alias) => alias.to_sql(sql),
        };
    }
}

impl SchemaName {
    pub fn to_sql(&self, sql: &mut SQL) {
        let SchemaName(name) = self;
        sql.append_identifier(name);
    }
}

impl TableName {
    pub fn to_sql(&self, sql: &mut SQL) {
        let TableName(name) = self;
        sql.append_identifier(name);
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        let name = format!("%{}_{}", self.unique_index, self.name);
        sql.append_identifier(&name);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            ColumnReference::TableColumn { table, name } => {
                table.to_sql(sql);
                sql.append_syntax(".");
                name.to_sql(sql);
            }
        };
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        let ColumnName(name) = self;
        sql.append_identifier(name);
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            for (index, order_by_item) in self.elements.iter().enumerate() {
                order_by_item.to_sql(sql);
                if index < (self.elements.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn bamba() -> (TableReference, TableAlias) {
        (
            TableReference::DBTable {
                schema: SchemaName("public".to_string()),
                table: TableName("bamba".to_string()),
            },
            TableAlias {
                unique_index: 0,
                name: "bamba".to_string(),
            },
        )
    }

    #[test]
    fn it_converts_simple_select() {
        let (reference, alias) = bamba();
        let mut select = helpers::simple_select(vec![helpers::make_column(
            TableReference::AliasedTable(alias.clone()),
            ColumnName("x".to_string()),
            helpers::make_column_alias("x".to_string()),
        )]);
        select.from = Some(From::Table { reference, alias });

        assert_eq!(
            select_to_sql(&select),
            SQL {
                sql: "SELECT \"%0_bamba\".\"x\" AS \"x\" FROM \"public\".\"bamba\" AS \"%0_bamba\""
                    .to_string(),
                params: vec![],
                param_index: 0,
            }
        );
    }

    #[test]
    fn it_converts_where_order_by_and_limit() {
        let (reference, alias) = bamba();
        let column = Expression::ColumnReference(ColumnReference::TableColumn {
            table: TableReference::AliasedTable(alias.clone()),
            name: ColumnName("x".to_string()),
        });
        let mut select = helpers::simple_select(vec![(
            helpers::make_column_alias("row".to_string()),
            Expression::RowToJson(TableReference::AliasedTable(alias.clone())),
        )]);
        select.from = Some(From::Table { reference, alias });
        select.where_ = Where(helpers::and_all(vec![
            Expression::BinaryOperation {
                left: Box::new(column.clone()),
                operator: BinaryOperator::GreaterThanOrEqualTo,
                right: Box::new(Expression::Cast {
                    expression: Box::new(Expression::Value(Value::String("100".to_string()))),
                    r#type: ScalarTypeName("integer"),
                }),
            },
            Expression::BinaryArrayOperation {
                left: Box::new(column.clone()),
                operator: BinaryArrayOperator::NotIn,
                right: vec![
                    Expression::Value(Value::String("1".to_string())),
                    Expression::Value(Value::String("2".to_string())),
                ],
            },
        ]));
        select.order_by = OrderBy {
            elements: vec![OrderByElement {
                target: column,
                direction: OrderByDirection::Desc,
            }],
        };
        select.limit = Limit {
            limit: Some(5),
            offset: Some(10),
        };

        let sql = select_to_sql(&select);
        assert_eq!(
            sql.sql,
            "SELECT row_to_json(\"%0_bamba\") AS \"row\" FROM \"public\".\"bamba\" AS \"%0_bamba\" \
             WHERE ((\"%0_bamba\".\"x\" >= CAST($1 AS integer)) AND (\"%0_bamba\".\"x\" NOT IN ($2, $3))) \
             ORDER BY \"%0_bamba\".\"x\" DESC LIMIT 5 OFFSET 10"
        );
        assert_eq!(
            sql.params,
            vec![
                Param::String("100".to_string()),
                Param::String("1".to_string()),
                Param::String("2".to_string()),
            ]
        );
    }

    #[test]
    fn a_true_where_clause_is_omitted() {
        let mut select = helpers::simple_select(vec![(
            helpers::make_column_alias("totalRecords".to_string()),
            Expression::Count(CountType::Star),
        )]);
        select.where_ = Where(helpers::and_all(vec![]));
        assert_eq!(
            select_to_sql(&select).sql,
            "SELECT COUNT(*) AS \"totalRecords\""
        );
    }
}

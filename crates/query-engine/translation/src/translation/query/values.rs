//! Handle the translation of literal values.

use query_engine_metadata::metadata::database;
use query_engine_sql::sql;

/// A request value compared against a column of the given type. Values travel as text
/// parameters and are cast to the column's type, except for text columns and columns of
/// unknown type.
pub fn translate_value(value: &str, scalar_type: database::ScalarType) -> sql::ast::Expression {
    let parameter = sql::ast::Expression::Value(sql::ast::Value::String(value.to_string()));
    match scalar_type.type_name() {
        Some(type_name) if !scalar_type.is_textual() => cast(parameter, type_name),
        _ => parameter,
    }
}

pub fn cast(expression: sql::ast::Expression, type_name: &'static str) -> sql::ast::Expression {
    sql::ast::Expression::Cast {
        expression: Box::new(expression),
        r#type: sql::ast::ScalarTypeName(type_name),
    }
}

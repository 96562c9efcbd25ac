//! What a filter operator asks of a column, independent of how it is evaluated.

use super::dates::DateLiteral;
use crate::translation::request::{OperatorKind, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// A condition on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive pattern match, `%` and `_` being wildcards.
    Like { pattern: String, negated: bool },
    /// Compare with a value in the column's type.
    Compare {
        operator: ComparisonOperator,
        value: String,
    },
    /// Set membership. Never true for an empty list, always true when negated.
    InList { values: Vec<String>, negated: bool },
    /// Compare the calendar date of the column.
    Date {
        operator: ComparisonOperator,
        date: DateLiteral,
    },
}

impl Predicate {
    /// The predicate an operator applies with a given value. A list given to an operator
    /// that only takes a single value applies no predicate.
    pub fn from_operator(operator: OperatorKind, value: &ParamValue) -> Option<Predicate> {
        match (operator, value) {
            (OperatorKind::Equals, ParamValue::List(values)) => Some(Predicate::InList {
                values: values.clone(),
                negated: false,
            }),
            (OperatorKind::NotEquals, ParamValue::List(values)) => Some(Predicate::InList {
                values: values.clone(),
                negated: true,
            }),
            (OperatorKind::In, ParamValue::List(values)) => Some(Predicate::InList {
                values: values.clone(),
                negated: false,
            }),
            (_, ParamValue::List(_)) => None,
            (operator, ParamValue::Single(value)) => Some(single_value_predicate(operator, value)),
        }
    }
}

fn single_value_predicate(operator: OperatorKind, value: &str) -> Predicate {
    let like = |pattern: String, negated: bool| Predicate::Like { pattern, negated };
    let compare = |operator: ComparisonOperator| Predicate::Compare {
        operator,
        value: value.to_string(),
    };
    let date = |operator: ComparisonOperator| Predicate::Date {
        operator,
        date: DateLiteral::parse(value),
    };
    match operator {
        OperatorKind::Contains => like(format!("%{value}%"), false),
        OperatorKind::NotContains => like(format!("%{value}%"), true),
        OperatorKind::StartsWith => like(format!("{value}%"), false),
        OperatorKind::EndsWith => like(format!("%{value}"), false),
        OperatorKind::Equals => compare(ComparisonOperator::Equal),
        OperatorKind::NotEquals => compare(ComparisonOperator::NotEqual),
        OperatorKind::In => Predicate::InList {
            values: vec![value.to_string()],
            negated: false,
        },
        OperatorKind::Lt => compare(ComparisonOperator::LessThan),
        OperatorKind::Lte => compare(ComparisonOperator::LessThanOrEqual),
        OperatorKind::Gt => compare(ComparisonOperator::GreaterThan),
        OperatorKind::Gte => compare(ComparisonOperator::GreaterThanOrEqual),
        OperatorKind::DateIs => date(ComparisonOperator::Equal),
        OperatorKind::DateIsNot => date(ComparisonOperator::NotEqual),
        OperatorKind::DateBefore => date(ComparisonOperator::LessThan),
        OperatorKind::DateAfter => date(ComparisonOperator::GreaterThan),
    }
}

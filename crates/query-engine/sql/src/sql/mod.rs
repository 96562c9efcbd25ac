//! The SQL side of the query engine: an AST, helpers to build it,
//! and its conversion to a parameterized SQL string.

pub mod ast;
pub mod convert;
pub mod execution_plan;
pub mod helpers;
pub mod string;

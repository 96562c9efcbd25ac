//! Translate list request parameters into an execution plan (SQL) to be run against the database.

pub mod error;
pub mod helpers;
pub mod plan;
pub mod query;
pub mod request;

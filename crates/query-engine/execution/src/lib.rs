//! Run list plans against a data source.
//!
//! A `ListPlan` is evaluated either by PostgreSQL, through the SQL produced by the
//! translation crate, or in memory over JSON records.

pub mod error;
pub mod memory;
pub mod metrics;
pub mod postgres;
pub mod query;

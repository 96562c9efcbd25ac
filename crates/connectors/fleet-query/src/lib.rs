//! An HTTP service listing the collections of a fleet database.
//!
//! Every list endpoint accepts the same flat query parameters (filters, one sort key and
//! offset pagination) and answers with a page of records and the total number of matches.

pub mod error;
pub mod health;
pub mod params;
pub mod query;
pub mod routes;
pub mod state;

//! remotable - remote relational sources as local SQLite virtual tables
//!
//! Discovers a remote schema once, negotiates which filters run remotely,
//! and streams coerced rows into the host query pipeline.

pub mod cli;
pub mod coerce;
pub mod config;
pub mod driver;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod schema;
pub mod vtab;

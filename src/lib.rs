//! Crew Dispatch Library
//!
//! Assignment engine for a small cleaning crew: workers with an eight hour
//! daily capacity, a task queue, and the query layer the front end reads.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod ids;
pub mod persist;
pub mod query;
pub mod store;
pub mod types;

//! Query execution for MicaDB
//!
//! Statement dispatch, constraint checking, join and condition evaluation.

pub mod executor;
pub mod filter;
pub mod join;

pub use executor::{ExecutionEngine, QueryResult};

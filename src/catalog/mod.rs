//! Catalog module for MicaDB
//!
//! Schema metadata and the process-wide table store.

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::Catalog;
pub use schema::{Column, TableSchema};
pub use types::DataType;

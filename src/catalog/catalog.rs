//! System catalog for MicaDB
//!
//! The catalog owns every table in the process. Access is single-threaded;
//! an embedder multiplexing callers must serialize them externally.

use std::collections::HashMap;

use super::schema::TableSchema;
use crate::error::{Error, Result};
use crate::storage::Table;

/// System catalog - the mapping from table name to table state
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
    /// Creation order, for stable listing
    order: Vec<String>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table
    pub fn create_table(&mut self, name: &str, schema: TableSchema) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }

        self.tables.insert(name.to_string(), Table::new(schema));
        self.order.push(name.to_string());
        Ok(())
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name, mutably
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop a table
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        self.order.retain(|n| n != name);
        Ok(())
    }

    /// All table names, in creation order
    pub fn table_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Schema of a named table, if present
    pub fn schema(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name).map(|t| t.schema())
    }

    /// Row count of a named table; 0 when the table is absent
    pub fn row_count(&self, name: &str) -> usize {
        self.tables.get(name).map_or(0, |t| t.row_count())
    }
}

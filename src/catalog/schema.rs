//! Schema definitions for MicaDB
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Column definition in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (matched case-sensitively)
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this the primary key column?
    pub primary_key: bool,
    /// Is this column unique?
    pub unique: bool,
    /// Must this column be non-null?
    pub not_null: bool,
}

impl Column {
    /// Create a new column with no constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            not_null: false,
        }
    }

    /// Set primary key flag (implies unique and not-null)
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        if pk {
            self.unique = true;
            self.not_null = true;
        }
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set not-null flag
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }
}

/// Table schema - the ordered column definitions of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Build a schema from column definitions.
    ///
    /// Fails when more than one column is marked primary key.
    pub fn new(table_name: &str, columns: Vec<Column>) -> Result<Self> {
        let pk_count = columns.iter().filter(|c| c.primary_key).count();
        if pk_count > 1 {
            return Err(Error::MultiplePrimaryKeys(table_name.to_string()));
        }
        Ok(Self { columns })
    }

    /// Get all columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The primary key column, if declared
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Names of all unique-constrained columns, primary key included
    pub fn unique_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.unique)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

//! Table storage for MicaDB
//!
//! A table owns its schema, the row vector, one B-tree index per
//! unique-constrained column, and the auto-increment counter for an integer
//! primary key.

use std::collections::HashMap;

use super::index::BTreeIndex;
use super::row::Row;
use super::value::Value;
use crate::catalog::TableSchema;

/// A table: schema plus in-memory state
#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
    indexes: HashMap<String, BTreeIndex>,
    next_auto_id: i64,
}

impl Table {
    /// Create an empty table, building a unique index for every
    /// unique-constrained column (primary key included).
    pub fn new(schema: TableSchema) -> Self {
        let indexes = schema
            .unique_columns()
            .into_iter()
            .map(|name| (name.to_string(), BTreeIndex::new(true)))
            .collect();

        Self {
            schema,
            rows: Vec::new(),
            indexes,
            next_auto_id: 1,
        }
    }

    /// The table schema
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All rows, in position order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The row at a position
    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Mutable access to the row at a position
    pub fn row_mut(&mut self, position: usize) -> Option<&mut Row> {
        self.rows.get_mut(position)
    }

    /// Append a row; its position is the previous row count
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// The index on a column, if that column is indexed
    pub fn index(&self, column: &str) -> Option<&BTreeIndex> {
        self.indexes.get(column)
    }

    /// Mutable access to the index on a column
    pub fn index_mut(&mut self, column: &str) -> Option<&mut BTreeIndex> {
        self.indexes.get_mut(column)
    }

    /// Names of indexed columns
    pub fn indexed_columns(&self) -> Vec<&str> {
        self.indexes.keys().map(|s| s.as_str()).collect()
    }

    /// Draw the next auto-increment primary key value
    pub fn next_auto_id(&mut self) -> i64 {
        let id = self.next_auto_id;
        self.next_auto_id += 1;
        id
    }

    /// Current auto-increment counter, without consuming it
    pub fn peek_auto_id(&self) -> i64 {
        self.next_auto_id
    }

    /// Remove the rows at the given positions.
    ///
    /// Positions are removed in descending order so that the positions not
    /// yet removed stay valid, then every index is rebuilt from the
    /// surviving rows: deletion shifts row positions, and a wholesale
    /// rebuild restores index/data coherence.
    pub fn remove_rows(&mut self, mut positions: Vec<usize>) {
        positions.sort_unstable();
        positions.dedup();
        for &position in positions.iter().rev() {
            self.rows.remove(position);
        }
        self.rebuild_indexes();
    }

    fn rebuild_indexes(&mut self) {
        for (column, index) in self.indexes.iter_mut() {
            let pairs = self
                .rows
                .iter()
                .enumerate()
                .map(|(position, row)| (row.get_or_null(column), position))
                .collect();
            // Surviving rows of a consistent table cannot violate
            // uniqueness.
            index
                .rebuild(pairs)
                .expect("rebuild from consistent rows cannot conflict");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};

    fn test_table() -> Table {
        let schema = TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(true),
                Column::new("name", DataType::Varchar(Some(50))),
            ],
        )
        .unwrap();
        Table::new(schema)
    }

    fn row(id: i64, name: &str) -> Row {
        let mut row = Row::new();
        row.set("id", Value::Integer(id));
        row.set("name", Value::Varchar(name.to_string()));
        row
    }

    #[test]
    fn test_indexes_created_for_unique_columns() {
        let table = test_table();
        assert!(table.index("id").is_some());
        assert!(table.index("name").is_none());
    }

    #[test]
    fn test_auto_id_counter() {
        let mut table = test_table();
        assert_eq!(table.next_auto_id(), 1);
        assert_eq!(table.next_auto_id(), 2);
        assert_eq!(table.peek_auto_id(), 3);
    }

    #[test]
    fn test_remove_rows_repacks_and_rebuilds() {
        let mut table = test_table();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let id = i as i64 + 1;
            table.push_row(row(id, name));
            table
                .index_mut("id")
                .unwrap()
                .insert(Value::Integer(id), i)
                .unwrap();
        }

        table.remove_rows(vec![1]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap().get("name"), Some(&Value::Varchar("c".into())));
        // The index now addresses "c" at its shifted position.
        assert_eq!(table.index("id").unwrap().search(&Value::Integer(3)), vec![1]);
        assert!(table.index("id").unwrap().search(&Value::Integer(2)).is_empty());
    }
}

//! Row representation for MicaDB
//!
//! A row maps column names to cell values. Join rows additionally expose
//! columns under their `table.column` qualified names.

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row in a table or in an intermediate result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Get a cell by column name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.get(name)
    }

    /// Get a cell by column name, treating absent columns as NULL
    pub fn get_or_null(&self, name: &str) -> Value {
        self.cells.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Set a cell
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.cells.insert(name.into(), value);
    }

    /// Check if a column is present
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Iterate over (column, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.cells.iter()
    }

    /// Number of cells in this row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access() {
        let mut row = Row::new();
        row.set("id", Value::Integer(1));
        row.set("name", Value::Varchar("ada".to_string()));

        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_or_null("missing"), Value::Null);
        assert!(row.contains("name"));
        assert_eq!(row.len(), 2);
    }
}

//! Query executor for MicaDB
//!
//! The execution engine owns the catalog, dispatches parsed statements, and
//! carries the write-path constraint checking and index maintenance.

use serde::Serialize;

use super::filter::{operand_value, row_matches};
use super::join::{apply_join, base_columns, qualified_base_rows};
use crate::catalog::{Catalog, Column, TableSchema};
use crate::error::{Error, Result};
use crate::sql;
use crate::sql::ast::*;
use crate::storage::{Row, Value};

/// Query result
///
/// SELECT sets `rows` (with `affected_rows` = row count); the other
/// statements set `message` and the mutation count. Failures surface as
/// `Err(Error)` from [`ExecutionEngine::execute`].
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Result rows, for SELECT
    pub rows: Option<Vec<Row>>,
    /// Number of rows returned or affected
    pub affected_rows: usize,
    /// Human-readable outcome message
    pub message: Option<String>,
}

impl QueryResult {
    /// Create a SELECT result
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            affected_rows: rows.len(),
            rows: Some(rows),
            message: None,
        }
    }

    /// Create a result with a message and no affected rows
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            rows: None,
            affected_rows: 0,
            message: Some(message.into()),
        }
    }

    /// Create a result with an affected-row count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            rows: None,
            affected_rows: count,
            message: Some(message.into()),
        }
    }
}

/// Execution engine - the engine surface consumed by embedders
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    catalog: Catalog,
}

impl ExecutionEngine {
    /// Create a new engine with an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and execute a single statement
    pub fn execute(&mut self, query: &str) -> Result<QueryResult> {
        let statement = sql::parse(query)?;
        tracing::debug!(?statement, "executing statement");

        match statement {
            Statement::CreateTable(create) => self.execute_create(create),
            Statement::Insert(insert) => self.execute_insert(insert),
            Statement::Select(select) => self.execute_select(select),
            Statement::Update(update) => self.execute_update(update),
            Statement::Delete(delete) => self.execute_delete(delete),
            Statement::DropTable(drop) => self.execute_drop(drop),
        }
    }

    /// All current table names, in creation order
    pub fn list_table_names(&self) -> Vec<String> {
        self.catalog.table_names()
    }

    /// Schema of a named table, if present
    pub fn schema(&self, table: &str) -> Option<&TableSchema> {
        self.catalog.schema(table)
    }

    /// Row count of a named table; 0 when the table is absent
    pub fn row_count(&self, table: &str) -> usize {
        self.catalog.row_count(table)
    }

    // ========== CREATE TABLE ==========

    fn execute_create(&mut self, create: CreateTableStatement) -> Result<QueryResult> {
        let mut columns: Vec<Column> = create
            .columns
            .into_iter()
            .map(|def| {
                Column::new(def.name, def.data_type)
                    .unique(def.unique)
                    .not_null(def.not_null)
                    .primary_key(def.primary_key)
            })
            .collect();

        // A standalone `PRIMARY KEY(col)` entry marks the named column.
        if let Some(pk_name) = create.table_primary_key {
            let column = columns
                .iter_mut()
                .find(|c| c.name == pk_name)
                .ok_or_else(|| Error::ColumnNotFound(pk_name.clone(), create.table.clone()))?;
            column.primary_key = true;
            column.unique = true;
            column.not_null = true;
        }

        let schema = TableSchema::new(&create.table, columns)?;
        self.catalog.create_table(&create.table, schema)?;

        tracing::info!(table = %create.table, "created table");
        Ok(QueryResult::with_message(format!(
            "Table '{}' created",
            create.table
        )))
    }

    // ========== INSERT ==========

    fn execute_insert(&mut self, insert: InsertStatement) -> Result<QueryResult> {
        if insert.columns.len() != insert.values.len() {
            return Err(Error::ColumnValueCountMismatch {
                expected: insert.columns.len(),
                found: insert.values.len(),
            });
        }

        let table = self.catalog.table_mut(&insert.table)?;
        let schema = table.schema().clone();

        // Candidate row: declared columns start out null.
        let mut row = Row::new();
        for column in schema.columns() {
            row.set(column.name.clone(), Value::Null);
        }

        for (name, literal) in insert.columns.iter().zip(insert.values.iter()) {
            let column = schema
                .column(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone(), insert.table.clone()))?;
            row.set(name.clone(), coerce_literal(column, literal)?);
        }

        // A missing or null integer primary key draws from the counter.
        if let Some(pk) = schema.primary_key() {
            if row.get_or_null(&pk.name).is_null()
                && pk.data_type == crate::catalog::DataType::Integer
            {
                let id = table.next_auto_id();
                row.set(pk.name.clone(), Value::Integer(id));
            }
        }

        for column in schema.columns() {
            if column.not_null && row.get_or_null(&column.name).is_null() {
                return Err(Error::NullNotAllowed(column.name.clone()));
            }
        }

        // Validate every indexed column before touching any index, so a
        // uniqueness failure leaves no stale postings behind.
        let position = table.row_count();
        let indexed: Vec<String> = table
            .indexed_columns()
            .into_iter()
            .map(String::from)
            .collect();
        for name in &indexed {
            let value = row.get_or_null(name);
            if !value.is_null() && table.index(name).is_some_and(|idx| idx.contains(&value)) {
                return Err(Error::DuplicateValue {
                    column: name.clone(),
                    value: value.to_string(),
                });
            }
        }

        for name in &indexed {
            let value = row.get_or_null(name);
            if let Some(index) = table.index_mut(name) {
                index.insert(value, position)?;
            }
        }
        table.push_row(row);

        Ok(QueryResult::with_affected_rows(1, "1 row(s) inserted"))
    }

    // ========== SELECT ==========

    fn execute_select(&mut self, select: SelectStatement) -> Result<QueryResult> {
        let table = self.catalog.table(&select.table)?;

        let mut rows = if select.joins.is_empty() {
            // Index-assisted filtering: the first equality condition over an
            // indexed column seeds the row set; the filter below re-checks
            // every condition, this one included.
            let seed = select.conditions.iter().find_map(|condition| {
                if condition.op != CompareOp::Eq {
                    return None;
                }
                let index = table.index(&condition.column)?;
                let value = operand_value(&condition.value)?;
                Some(index.search(&value))
            });

            match seed {
                Some(postings) => postings
                    .into_iter()
                    .filter_map(|position| table.row(position).cloned())
                    .collect(),
                None => table.rows().to_vec(),
            }
        } else {
            let mut rows = qualified_base_rows(&select.table, table);
            let mut columns = base_columns(&select.table, table);
            for join in &select.joins {
                (rows, columns) = apply_join(rows, &columns, join, &self.catalog)?;
            }
            rows
        };

        rows.retain(|row| row_matches(row, &select.conditions));

        if let Some(order_by) = &select.order_by {
            let column = order_by.column.as_str();
            rows.sort_by(|a, b| {
                let ordering = a.get_or_null(column).total_cmp(&b.get_or_null(column));
                if order_by.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = select.limit {
            rows.truncate(limit);
        }

        let projected = match &select.columns {
            SelectColumns::All => rows,
            SelectColumns::Columns(names) => rows
                .into_iter()
                .map(|row| {
                    // Absent names produce no key, not a null.
                    names
                        .iter()
                        .filter_map(|name| {
                            row.get(name).map(|value| (name.clone(), value.clone()))
                        })
                        .collect()
                })
                .collect(),
        };

        Ok(QueryResult::with_rows(projected))
    }

    // ========== UPDATE ==========

    fn execute_update(&mut self, update: UpdateStatement) -> Result<QueryResult> {
        let table = self.catalog.table_mut(&update.table)?;
        let schema = table.schema().clone();

        let mut assignments: Vec<(String, Value)> = Vec::with_capacity(update.assignments.len());
        for (name, literal) in &update.assignments {
            let column = schema
                .column(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone(), update.table.clone()))?;
            let value = coerce_literal(column, literal)?;
            if column.not_null && value.is_null() {
                return Err(Error::NullNotAllowed(name.clone()));
            }
            assignments.push((name.clone(), value));
        }

        let positions: Vec<usize> = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &update.conditions))
            .map(|(position, _)| position)
            .collect();

        // Phase one: every indexed assignment is validated before any index
        // or cell changes, so a conflict aborts the whole statement.
        for (name, new_value) in &assignments {
            if table.index(name).is_none() || new_value.is_null() {
                continue;
            }
            let mut changing = 0usize;
            for &position in &positions {
                let current = table.row(position).map(|r| r.get_or_null(name));
                if current.as_ref() == Some(new_value) {
                    continue;
                }
                changing += 1;
                let conflict = table
                    .index(name)
                    .map(|idx| idx.search(new_value))
                    .unwrap_or_default()
                    .into_iter()
                    .any(|posting| posting != position);
                if conflict {
                    return Err(Error::DuplicateValue {
                        column: name.clone(),
                        value: new_value.to_string(),
                    });
                }
            }
            // Two rows updated to the same unique value collide with each
            // other even though neither is in the index yet.
            if changing > 1 {
                return Err(Error::DuplicateValue {
                    column: name.clone(),
                    value: new_value.to_string(),
                });
            }
        }

        // Phase two: swap index postings and overwrite cells.
        for &position in &positions {
            for (name, new_value) in &assignments {
                let current = match table.row(position) {
                    Some(row) => row.get_or_null(name),
                    None => continue,
                };
                if current != *new_value {
                    if let Some(index) = table.index_mut(name) {
                        index.remove(&current, position);
                        index.insert(new_value.clone(), position)?;
                    }
                }
                if let Some(row) = table.row_mut(position) {
                    row.set(name.clone(), new_value.clone());
                }
            }
        }

        let affected = positions.len();
        Ok(QueryResult::with_affected_rows(
            affected,
            format!("{} row(s) updated", affected),
        ))
    }

    // ========== DELETE ==========

    fn execute_delete(&mut self, delete: DeleteStatement) -> Result<QueryResult> {
        let table = self.catalog.table_mut(&delete.table)?;

        let positions: Vec<usize> = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &delete.conditions))
            .map(|(position, _)| position)
            .collect();

        let indexed: Vec<String> = table
            .indexed_columns()
            .into_iter()
            .map(String::from)
            .collect();
        for &position in &positions {
            for name in &indexed {
                let value = match table.row(position) {
                    Some(row) => row.get_or_null(name),
                    None => continue,
                };
                if let Some(index) = table.index_mut(name) {
                    index.remove(&value, position);
                }
            }
        }

        // Removal shifts positions, so the table rebuilds every index from
        // the surviving rows.
        let affected = positions.len();
        table.remove_rows(positions);

        Ok(QueryResult::with_affected_rows(
            affected,
            format!("{} row(s) deleted", affected),
        ))
    }

    // ========== DROP ==========

    fn execute_drop(&mut self, drop: DropTableStatement) -> Result<QueryResult> {
        self.catalog.drop_table(&drop.table)?;

        tracing::info!(table = %drop.table, "dropped table");
        Ok(QueryResult::with_message(format!(
            "Table '{}' dropped",
            drop.table
        )))
    }
}

/// Convert a literal to a cell value for a column, checking the declared
/// type, and the maximum length for VARCHAR.
fn coerce_literal(column: &Column, literal: &Literal) -> Result<Value> {
    use crate::catalog::DataType;

    let mismatch = |found: &str| Error::TypeMismatch {
        column: column.name.clone(),
        expected: column.data_type.to_string(),
        found: found.to_string(),
    };

    match (&column.data_type, literal) {
        (_, Literal::Null) => Ok(Value::Null),

        (DataType::Integer, Literal::Integer(i)) => Ok(Value::Integer(*i)),
        // An exact integer in float clothing is accepted; 3.5 is not.
        (DataType::Integer, Literal::Float(f)) if f.fract() == 0.0 => {
            Ok(Value::Integer(*f as i64))
        }
        (DataType::Integer, Literal::Float(f)) => Err(mismatch(&f.to_string())),

        (DataType::Varchar(max), Literal::String(s)) => {
            if let Some(max) = max {
                let len = s.chars().count();
                if len > *max {
                    return Err(Error::ValueTooLong {
                        column: column.name.clone(),
                        max: *max,
                        len,
                    });
                }
            }
            Ok(Value::Varchar(s.clone()))
        }

        (DataType::Boolean, Literal::Boolean(b)) => Ok(Value::Boolean(*b)),

        // Timestamp columns accept an uninterpreted string; the engine does
        // not parse it further.
        (DataType::Timestamp, Literal::String(s)) => Ok(Value::Varchar(s.clone())),

        (_, other) => Err(mismatch(literal_kind(other))),
    }
}

fn literal_kind(literal: &Literal) -> &'static str {
    match literal {
        Literal::Null => "NULL",
        Literal::Boolean(_) => "BOOLEAN",
        Literal::Integer(_) => "INT",
        Literal::Float(_) => "FLOAT",
        Literal::String(_) => "VARCHAR",
    }
}

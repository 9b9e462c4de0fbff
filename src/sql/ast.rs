//! Parsed query representation
//!
//! This module defines the statement records produced by the parser and
//! consumed by the executor: a closed sum over the six statement kinds.

use crate::catalog::DataType;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table: String,
    /// Column definitions in declaration order
    pub columns: Vec<ColumnDef>,
    /// Column named by a standalone `PRIMARY KEY(col)` entry, if any
    pub table_primary_key: Option<String>,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// NOT NULL constraint
    pub not_null: bool,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table: String,
    /// Column names
    pub columns: Vec<String>,
    /// Values, one literal per column
    pub values: Vec<Literal>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Requested columns
    pub columns: SelectColumns,
    /// Base table name
    pub table: String,
    /// JOIN clauses, in declaration order
    pub joins: Vec<JoinClause>,
    /// WHERE conditions (empty when absent)
    pub conditions: Vec<Condition>,
    /// ORDER BY clause
    pub order_by: Option<OrderBy>,
    /// LIMIT clause
    pub limit: Option<usize>,
}

/// The SELECT column list: `*` or explicit names
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    /// All columns (*)
    All,
    /// Named columns (`name` or `table.name`)
    Columns(Vec<String>),
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Join kind (a bare JOIN is INNER)
    pub kind: JoinKind,
    /// Table to join
    pub table: String,
    /// Optional alias (`AS alias`)
    pub alias: Option<String>,
    /// Left side of the ON predicate
    pub on_left: ColumnRef,
    /// Right side of the ON predicate
    pub on_right: ColumnRef,
}

/// Kind of JOIN
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

/// A `table.column` reference in an ON predicate
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Table name or alias
    pub table: String,
    /// Column name
    pub column: String,
}

/// One WHERE condition.
///
/// Conditions form a flat left-to-right sequence; `connective` is the AND/OR
/// that joined this condition to the previous one (`None` on the first).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Connective preceding this condition
    pub connective: Option<Connective>,
    /// Left-hand column (`name` or `table.name`, kept as written)
    pub column: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Right-hand literal
    pub value: Literal,
}

/// Logical connective between conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Connective {
    And,
    Or,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    /// =
    Eq,
    /// != or <>
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// LIKE
    Like,
}

/// ORDER BY clause: a single column with a direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Ordering column
    pub column: String,
    /// Descending order (ASC is the default)
    pub descending: bool,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table: String,
    /// SET clause (column, literal) pairs
    pub assignments: Vec<(String, Literal)>,
    /// WHERE conditions (empty when absent)
    pub conditions: Vec<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table: String,
    /// WHERE conditions (empty when absent)
    pub conditions: Vec<Condition>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table: String,
}

/// Literal value as written in the query text.
///
/// Floats exist only at this level: the cell value model has no float kind,
/// and the executor rejects non-integral floats wherever a cell is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
}

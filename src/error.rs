//! Error surface for MicaDB
//!
//! Every fallible operation in the engine reports one of the [`Error`]
//! variants below. The rendered message is the human-readable string an
//! embedder shows to its users; it is not a stable programmatic surface.

use thiserror::Error;

/// All the ways a statement can fail
#[derive(Error, Debug)]
pub enum Error {
    // lexing
    #[error("unexpected character '{0}' in query at offset {1}")]
    UnexpectedCharacter(char, usize),

    #[error("string literal opened at offset {0} is never closed")]
    UnterminatedString(usize),

    #[error("malformed numeric literal at offset {0}")]
    InvalidNumber(usize),

    // parsing
    #[error("expected {expected} but found '{found}'")]
    UnexpectedToken { expected: String, found: String },

    #[error("query ended before {0}")]
    UnexpectedEof(String),

    #[error("invalid statement: {0}")]
    ParseError(String),

    // schema
    #[error("no such table '{0}'")]
    TableNotFound(String),

    #[error("a table named '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("table '{1}' has no column '{0}'")]
    ColumnNotFound(String, String),

    #[error("table '{0}' declares more than one primary key")]
    MultiplePrimaryKeys(String),

    // values and constraints
    #[error("column '{column}' holds {expected}, cannot store {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("column '{0}' is NOT NULL but received a null value")]
    NullNotAllowed(String),

    #[error("value for column '{column}' is {len} characters, over the VARCHAR({max}) limit")]
    ValueTooLong {
        column: String,
        max: usize,
        len: usize,
    },

    #[error("duplicate value '{value}' violates the unique constraint on column '{column}'")]
    DuplicateValue { column: String, value: String },

    #[error("unique index already holds value '{0}'")]
    DuplicateIndexValue(String),

    #[error("INSERT names {expected} column(s) but supplies {found} value(s)")]
    ColumnValueCountMismatch { expected: usize, found: usize },
}

/// Shorthand result for engine operations
pub type Result<T> = std::result::Result<T, Error>;

//! MicaDB - an in-memory relational database engine written in Rust
//!
//! This library provides the core components of a small SQL database:
//! - Query parsing (lexer, parser, statement records)
//! - In-memory storage (values, rows, tables, B-tree indexes)
//! - Query execution (constraint checking, joins, filtering, ordering)
//! - System catalog
//!
//! All state lives in process memory and is gone when the process exits.
//! The engine is single-threaded: callers sharing an
//! [`ExecutionEngine`] across threads must serialize access externally.
//!
//! ```
//! use micadb::ExecutionEngine;
//!
//! let mut engine = ExecutionEngine::new();
//! engine.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50) NOT NULL)").unwrap();
//! engine.execute("INSERT INTO users (name) VALUES ('ada')").unwrap();
//!
//! let result = engine.execute("SELECT * FROM users WHERE id = 1").unwrap();
//! assert_eq!(result.affected_rows, 1);
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};
pub use executor::{ExecutionEngine, QueryResult};
pub use storage::{Row, Value};

//! SQL front-end for MicaDB
//!
//! Lexing and parsing of the query language into statement records.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use parser::{parse, Parser};

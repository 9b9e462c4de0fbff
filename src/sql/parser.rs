//! SQL Parser
//!
//! This module parses token streams into statement records. The six
//! statement kinds are distinguished by their leading keyword; WHERE clauses
//! come out as a flat condition sequence with per-condition connectives.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a query string
    pub fn new(sql: &str) -> Result<Self> {
        let tokens = Lexer::new(sql).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement, allowing one optional trailing semicolon
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }
        if !self.check(&Token::Eof) {
            return Err(Error::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: self.current().to_string(),
            });
        }

        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create().map(Statement::CreateTable),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Drop => self.parse_drop().map(Statement::DropTable),
            _ => Err(Error::UnexpectedToken {
                expected: "SELECT, INSERT, UPDATE, DELETE, CREATE, or DROP".to_string(),
                found: self.current().to_string(),
            }),
        }
    }

    // ========== CREATE TABLE ==========

    fn parse_create(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;

        let table = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        let mut table_primary_key = None;

        loop {
            if self.check(&Token::Primary) {
                // Standalone `PRIMARY KEY(col)` definition entry.
                self.advance();
                self.expect(&Token::Key)?;
                self.expect(&Token::LParen)?;
                table_primary_key = Some(self.expect_identifier()?);
                self.expect(&Token::RParen)?;
            } else {
                columns.push(self.parse_column_def()?);
            }

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table,
            columns,
            table_primary_key,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut primary_key = false;
        let mut unique = false;
        let mut not_null = false;

        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    self.expect(&Token::Key)?;
                    primary_key = true;
                    not_null = true;
                }
                Token::Unique => {
                    self.advance();
                    unique = true;
                }
                Token::Not => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    not_null = true;
                }
                _ => break,
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            primary_key,
            unique,
            not_null,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let data_type = match self.current() {
            Token::Int => {
                self.advance();
                DataType::Integer
            }
            Token::Varchar => {
                self.advance();
                let max = if self.check(&Token::LParen) {
                    self.advance();
                    let n = self.expect_integer()?;
                    if n < 0 {
                        return Err(Error::ParseError(format!(
                            "invalid VARCHAR length {}",
                            n
                        )));
                    }
                    self.expect(&Token::RParen)?;
                    Some(n as usize)
                } else {
                    None
                };
                DataType::Varchar(max)
            }
            Token::Boolean => {
                self.advance();
                DataType::Boolean
            }
            Token::Timestamp => {
                self.advance();
                DataType::Timestamp
            }
            other => {
                return Err(Error::UnexpectedToken {
                    expected: "INT, VARCHAR, BOOLEAN, or TIMESTAMP".to_string(),
                    found: other.to_string(),
                })
            }
        };
        Ok(data_type)
    }

    // ========== INSERT ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table = self.expect_identifier()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        self.expect(&Token::Values)?;

        self.expect(&Token::LParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = if self.check(&Token::Asterisk) {
            self.advance();
            SelectColumns::All
        } else {
            let mut names = Vec::new();
            loop {
                names.push(self.parse_column_name()?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            SelectColumns::Columns(names)
        };

        self.expect(&Token::From)?;
        let table = self.expect_identifier()?;

        let mut joins = Vec::new();
        while self.is_join_keyword() {
            joins.push(self.parse_join()?);
        }

        let conditions = if self.check(&Token::Where) {
            self.advance();
            self.parse_conditions()?
        } else {
            Vec::new()
        };

        let order_by = if self.check(&Token::Order) {
            self.advance();
            self.expect(&Token::By)?;
            let column = self.parse_column_name()?;
            let descending = if self.check(&Token::Desc) {
                self.advance();
                true
            } else {
                if self.check(&Token::Asc) {
                    self.advance();
                }
                false
            };
            Some(OrderBy { column, descending })
        } else {
            None
        };

        let limit = if self.check(&Token::Limit) {
            self.advance();
            let n = self.expect_integer()?;
            if n < 0 {
                return Err(Error::ParseError(format!(
                    "LIMIT must be non-negative, got {}",
                    n
                )));
            }
            Some(n as usize)
        } else {
            None
        };

        Ok(SelectStatement {
            columns,
            table,
            joins,
            conditions,
            order_by,
            limit,
        })
    }

    fn is_join_keyword(&self) -> bool {
        matches!(
            self.current(),
            Token::Join | Token::Inner | Token::Left | Token::Right
        )
    }

    fn parse_join(&mut self) -> Result<JoinClause> {
        let kind = match self.current() {
            Token::Inner => {
                self.advance();
                JoinKind::Inner
            }
            Token::Left => {
                self.advance();
                JoinKind::Left
            }
            Token::Right => {
                self.advance();
                JoinKind::Right
            }
            // A bare JOIN means INNER JOIN
            _ => JoinKind::Inner,
        };
        self.expect(&Token::Join)?;

        let table = self.expect_identifier()?;

        let alias = if self.check(&Token::As) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };

        self.expect(&Token::On)?;
        let on_left = self.parse_qualified_column()?;
        self.expect(&Token::Eq)?;
        let on_right = self.parse_qualified_column()?;

        Ok(JoinClause {
            kind,
            table,
            alias,
            on_left,
            on_right,
        })
    }

    fn parse_qualified_column(&mut self) -> Result<ColumnRef> {
        let table = self.expect_identifier()?;
        self.expect(&Token::Dot)?;
        let column = self.expect_identifier()?;
        Ok(ColumnRef { table, column })
    }

    // ========== WHERE conditions ==========

    /// Parse a flat AND/OR-connected condition sequence. Each non-first
    /// condition carries the connective that preceded it; evaluation is a
    /// left-to-right fold with no precedence.
    fn parse_conditions(&mut self) -> Result<Vec<Condition>> {
        let mut conditions = vec![self.parse_condition(None)?];

        loop {
            let connective = match self.current() {
                Token::And => Connective::And,
                Token::Or => Connective::Or,
                _ => break,
            };
            self.advance();
            conditions.push(self.parse_condition(Some(connective))?);
        }

        Ok(conditions)
    }

    fn parse_condition(&mut self, connective: Option<Connective>) -> Result<Condition> {
        let column = self.parse_column_name()?;

        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::Lte => CompareOp::Lte,
            Token::Gte => CompareOp::Gte,
            Token::Like => CompareOp::Like,
            other => {
                return Err(Error::UnexpectedToken {
                    expected: "comparison operator".to_string(),
                    found: other.to_string(),
                })
            }
        };
        self.advance();

        let value = self.parse_literal()?;

        Ok(Condition {
            connective,
            column,
            op,
            value,
        })
    }

    // ========== UPDATE ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;
        let table = self.expect_identifier()?;
        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push((column, value));

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let conditions = if self.check(&Token::Where) {
            self.advance();
            self.parse_conditions()?
        } else {
            Vec::new()
        };

        Ok(UpdateStatement {
            table,
            assignments,
            conditions,
        })
    }

    // ========== DELETE ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;
        let table = self.expect_identifier()?;

        let conditions = if self.check(&Token::Where) {
            self.advance();
            self.parse_conditions()?
        } else {
            Vec::new()
        };

        Ok(DeleteStatement { table, conditions })
    }

    // ========== DROP ==========

    fn parse_drop(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;
        let table = self.expect_identifier()?;
        Ok(DropTableStatement { table })
    }

    // ========== Shared pieces ==========

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current().clone() {
            Token::Null => Literal::Null,
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::IntegerLiteral(i) => Literal::Integer(i),
            Token::FloatLiteral(f) => Literal::Float(f),
            Token::StringLiteral(s) => Literal::String(s),
            other => {
                return Err(Error::UnexpectedToken {
                    expected: "literal value".to_string(),
                    found: other.to_string(),
                })
            }
        };
        self.advance();
        Ok(literal)
    }

    /// A column reference: `name` or `table.name`, kept as written
    fn parse_column_name(&mut self) -> Result<String> {
        let first = self.expect_identifier()?;
        if self.check(&Token::Dot) {
            self.advance();
            let second = self.expect_identifier()?;
            Ok(format!("{}.{}", first, second))
        } else {
            Ok(first)
        }
    }

    // ========== Token cursor ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else if self.check(&Token::Eof) {
            Err(Error::UnexpectedEof(token.to_string()))
        } else {
            Err(Error::UnexpectedToken {
                expected: token.to_string(),
                found: self.current().to_string(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(Error::UnexpectedEof("identifier".to_string())),
            other => Err(Error::UnexpectedToken {
                expected: "identifier".to_string(),
                found: other.to_string(),
            }),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match *self.current() {
            Token::IntegerLiteral(i) => {
                self.advance();
                Ok(i)
            }
            ref other => Err(Error::UnexpectedToken {
                expected: "integer".to_string(),
                found: other.to_string(),
            }),
        }
    }
}

/// Parse a single statement from a query string
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let stmt = parse(
            "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255) UNIQUE, \
             name VARCHAR(100) NOT NULL, active BOOLEAN, created_at TIMESTAMP)",
        )
        .unwrap();

        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(create.table, "users");
        assert_eq!(create.columns.len(), 5);

        let id = &create.columns[0];
        assert!(id.primary_key);
        assert!(id.not_null);
        assert_eq!(id.data_type, DataType::Integer);

        let email = &create.columns[1];
        assert!(email.unique);
        assert_eq!(email.data_type, DataType::Varchar(Some(255)));

        let name = &create.columns[2];
        assert!(name.not_null);
        assert!(!name.unique);

        assert_eq!(create.columns[3].data_type, DataType::Boolean);
        assert_eq!(create.columns[4].data_type, DataType::Timestamp);
        assert_eq!(create.table_primary_key, None);
    }

    #[test]
    fn test_parse_standalone_primary_key_entry() {
        let stmt = parse("CREATE TABLE t (id INT, name VARCHAR, PRIMARY KEY(id))").unwrap();
        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(create.columns.len(), 2);
        assert_eq!(create.table_primary_key.as_deref(), Some("id"));
        assert!(!create.columns[0].primary_key);
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse(
            "INSERT INTO users (id, name, active) VALUES (1, 'ada', TRUE);",
        )
        .unwrap();

        let Statement::Insert(insert) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.table, "users");
        assert_eq!(insert.columns, vec!["id", "name", "active"]);
        assert_eq!(
            insert.values,
            vec![
                Literal::Integer(1),
                Literal::String("ada".to_string()),
                Literal::Boolean(true)
            ]
        );
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = parse("SELECT * FROM users").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.columns, SelectColumns::All);
        assert_eq!(select.table, "users");
        assert!(select.joins.is_empty());
        assert!(select.conditions.is_empty());
        assert!(select.order_by.is_none());
        assert!(select.limit.is_none());
    }

    #[test]
    fn test_parse_select_full() {
        let stmt = parse(
            "SELECT id, u.name FROM users \
             WHERE age >= 18 AND name LIKE 'a%' OR active = TRUE \
             ORDER BY name DESC LIMIT 10",
        )
        .unwrap();

        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(
            select.columns,
            SelectColumns::Columns(vec!["id".to_string(), "u.name".to_string()])
        );

        assert_eq!(select.conditions.len(), 3);
        assert_eq!(select.conditions[0].connective, None);
        assert_eq!(select.conditions[0].op, CompareOp::Gte);
        assert_eq!(select.conditions[1].connective, Some(Connective::And));
        assert_eq!(select.conditions[1].op, CompareOp::Like);
        assert_eq!(select.conditions[2].connective, Some(Connective::Or));
        assert_eq!(select.conditions[2].value, Literal::Boolean(true));

        let order_by = select.order_by.unwrap();
        assert_eq!(order_by.column, "name");
        assert!(order_by.descending);
        assert_eq!(select.limit, Some(10));
    }

    #[test]
    fn test_parse_joins() {
        let stmt = parse(
            "SELECT * FROM a \
             JOIN b ON a.id = b.aid \
             LEFT JOIN c AS cc ON a.id = cc.aid \
             RIGHT JOIN d ON d.x = a.id",
        )
        .unwrap();

        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.joins.len(), 3);

        assert_eq!(select.joins[0].kind, JoinKind::Inner);
        assert_eq!(select.joins[0].table, "b");
        assert_eq!(select.joins[0].alias, None);
        assert_eq!(
            select.joins[0].on_left,
            ColumnRef {
                table: "a".to_string(),
                column: "id".to_string()
            }
        );

        assert_eq!(select.joins[1].kind, JoinKind::Left);
        assert_eq!(select.joins[1].alias.as_deref(), Some("cc"));

        assert_eq!(select.joins[2].kind, JoinKind::Right);
        assert_eq!(select.joins[2].on_left.table, "d");
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse("UPDATE users SET name = 'bob', active = FALSE WHERE id = 3").unwrap();
        let Statement::Update(update) = stmt else {
            panic!("expected UPDATE");
        };
        assert_eq!(update.table, "users");
        assert_eq!(
            update.assignments,
            vec![
                ("name".to_string(), Literal::String("bob".to_string())),
                ("active".to_string(), Literal::Boolean(false))
            ]
        );
        assert_eq!(update.conditions.len(), 1);
    }

    #[test]
    fn test_parse_delete() {
        let stmt = parse("DELETE FROM users WHERE id != 1").unwrap();
        let Statement::Delete(delete) = stmt else {
            panic!("expected DELETE");
        };
        assert_eq!(delete.table, "users");
        assert_eq!(delete.conditions[0].op, CompareOp::Neq);

        let stmt = parse("DELETE FROM users").unwrap();
        let Statement::Delete(delete) = stmt else {
            panic!("expected DELETE");
        };
        assert!(delete.conditions.is_empty());
    }

    #[test]
    fn test_parse_drop() {
        let stmt = parse("DROP TABLE users;").unwrap();
        assert_eq!(
            stmt,
            Statement::DropTable(DropTableStatement {
                table: "users".to_string()
            })
        );
    }

    #[test]
    fn test_neq_spellings_agree() {
        let a = parse("SELECT * FROM t WHERE x != 1").unwrap();
        let b = parse("SELECT * FROM t WHERE x <> 1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_statement() {
        let result = parse("EXPLAIN SELECT * FROM t");
        assert!(matches!(result, Err(Error::UnexpectedToken { .. })));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let result = parse("SELECT * FROM t garbage");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_limit_rejected() {
        let result = parse("SELECT * FROM t LIMIT -1");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_truncated_statement() {
        let result = parse("INSERT INTO t (a) VALUES");
        assert!(matches!(result, Err(Error::UnexpectedEof(_))));
    }
}

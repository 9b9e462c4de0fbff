//! WHERE-condition evaluation
//!
//! Conditions form a flat sequence; evaluation is a strict left-to-right
//! fold over the per-condition connectives, so `A OR B AND C` means
//! `(A OR B) AND C`. AND has no precedence over OR.

use std::cmp::Ordering;

use regex::RegexBuilder;

use crate::sql::ast::{CompareOp, Condition, Connective, Literal};
use crate::storage::{Row, Value};

/// Evaluate the full condition sequence against one row. An empty sequence
/// matches everything.
pub fn row_matches(row: &Row, conditions: &[Condition]) -> bool {
    let mut result = true;
    for (i, condition) in conditions.iter().enumerate() {
        let matched = eval_condition(row, condition);
        result = if i == 0 {
            matched
        } else {
            match condition.connective {
                Some(Connective::Or) => result || matched,
                // AND is also the fallback for a malformed missing connective.
                _ => result && matched,
            }
        };
    }
    result
}

fn eval_condition(row: &Row, condition: &Condition) -> bool {
    let cell = row.get_or_null(&condition.column);

    match condition.op {
        CompareOp::Eq | CompareOp::Neq => {
            let equal = match operand_value(&condition.value) {
                Some(operand) => cell == operand,
                // A literal with no cell representation equals nothing.
                None => false,
            };
            if condition.op == CompareOp::Eq {
                equal
            } else {
                !equal
            }
        }
        CompareOp::Lt | CompareOp::Gt | CompareOp::Lte | CompareOp::Gte => {
            let Some(operand) = operand_value(&condition.value) else {
                return false;
            };
            if cell.is_null() || operand.is_null() {
                return false;
            }
            match cell.cmp_same_kind(&operand) {
                Some(ordering) => match condition.op {
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Lte => ordering != Ordering::Greater,
                    CompareOp::Gte => ordering != Ordering::Less,
                    _ => unreachable!(),
                },
                None => false,
            }
        }
        CompareOp::Like => match (&cell, &condition.value) {
            (Value::Varchar(text), Literal::String(pattern)) => like_matches(text, pattern),
            _ => false,
        },
    }
}

/// Convert a literal to its cell value for comparison.
///
/// Floats with a zero fractional part collapse to integers; other floats
/// have no cell representation and yield `None`.
pub fn operand_value(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::Null => Some(Value::Null),
        Literal::Boolean(b) => Some(Value::Boolean(*b)),
        Literal::Integer(i) => Some(Value::Integer(*i)),
        Literal::Float(f) if f.fract() == 0.0 => Some(Value::Integer(*f as i64)),
        Literal::Float(_) => None,
        Literal::String(s) => Some(Value::Varchar(s.clone())),
    }
}

/// SQL LIKE matching: `%` matches any sequence, `_` matches one character.
/// Case-insensitive, anchored at both ends.
pub fn like_matches(text: &str, pattern: &str) -> bool {
    let mut translated = String::with_capacity(pattern.len() + 2);
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');

    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::Condition;

    fn cond(column: &str, op: CompareOp, value: Literal) -> Condition {
        Condition {
            connective: None,
            column: column.to_string(),
            op,
            value,
        }
    }

    fn with_connective(connective: Connective, mut condition: Condition) -> Condition {
        condition.connective = Some(connective);
        condition
    }

    fn sample_row() -> Row {
        let mut row = Row::new();
        row.set("k", Value::Integer(1));
        row.set("f", Value::Varchar("A".to_string()));
        row.set("n", Value::Null);
        row
    }

    #[test]
    fn test_eq_is_strict() {
        let row = sample_row();
        assert!(row_matches(&row, &[cond("k", CompareOp::Eq, Literal::Integer(1))]));
        assert!(!row_matches(&row, &[cond("k", CompareOp::Eq, Literal::Integer(2))]));
        // Cross-kind equality is always false.
        assert!(!row_matches(
            &row,
            &[cond("k", CompareOp::Eq, Literal::String("1".to_string()))]
        ));
        // NULL = NULL holds under strict equality.
        assert!(row_matches(&row, &[cond("n", CompareOp::Eq, Literal::Null)]));
    }

    #[test]
    fn test_range_ops_reject_null_and_cross_kind() {
        let row = sample_row();
        assert!(row_matches(&row, &[cond("k", CompareOp::Lt, Literal::Integer(5))]));
        assert!(!row_matches(&row, &[cond("n", CompareOp::Lt, Literal::Integer(5))]));
        assert!(!row_matches(&row, &[cond("k", CompareOp::Lt, Literal::Null)]));
        assert!(!row_matches(
            &row,
            &[cond("k", CompareOp::Lt, Literal::String("5".to_string()))]
        ));
        assert!(row_matches(&row, &[cond("k", CompareOp::Gte, Literal::Integer(1))]));
        assert!(row_matches(&row, &[cond("k", CompareOp::Lte, Literal::Integer(1))]));
    }

    #[test]
    fn test_fold_has_no_precedence() {
        // k = 1 OR k = 1 AND f = 'B'  ==  (k=1 OR k=1) AND f='B'  ==  false
        let row = sample_row();
        let conditions = vec![
            cond("k", CompareOp::Eq, Literal::Integer(1)),
            with_connective(Connective::Or, cond("k", CompareOp::Eq, Literal::Integer(1))),
            with_connective(
                Connective::And,
                cond("f", CompareOp::Eq, Literal::String("B".to_string())),
            ),
        ];
        assert!(!row_matches(&row, &conditions));
    }

    #[test]
    fn test_empty_conditions_match() {
        assert!(row_matches(&sample_row(), &[]));
    }

    #[test]
    fn test_like_wildcards() {
        assert!(like_matches("hello", "%"));
        assert!(like_matches("", "%"));
        assert!(like_matches("", ""));
        assert!(!like_matches("x", ""));
        assert!(like_matches("hello", "h_llo"));
        assert!(!like_matches("hllo", "h_llo"));
        assert!(like_matches("hello world", "hello%"));
        assert!(like_matches("HELLO", "hello"));
        // Anchored at both ends.
        assert!(!like_matches("say hello there", "hello"));
        // Regex metacharacters in the pattern are literal.
        assert!(like_matches("a.b", "a.b"));
        assert!(!like_matches("axb", "a.b"));
    }

    #[test]
    fn test_like_requires_strings() {
        let row = sample_row();
        assert!(!row_matches(
            &row,
            &[cond("k", CompareOp::Like, Literal::String("%".to_string()))]
        ));
        assert!(!row_matches(&row, &[cond("f", CompareOp::Like, Literal::Integer(1))]));
    }

    #[test]
    fn test_fractional_float_operand_never_matches() {
        let row = sample_row();
        assert!(!row_matches(&row, &[cond("k", CompareOp::Eq, Literal::Float(1.5))]));
        assert!(!row_matches(&row, &[cond("k", CompareOp::Lt, Literal::Float(1.5))]));
        // An integral float collapses to the integer.
        assert!(row_matches(&row, &[cond("k", CompareOp::Eq, Literal::Float(1.0))]));
    }
}

//! Join evaluation
//!
//! Joins run left-to-right in declared order as nested loops over the
//! current row sequence. Combined rows expose every joined column under its
//! `table.column` qualified name and, when the name is not already taken on
//! the left, under the bare column name as well.
//!
//! The column layout of the working set is threaded alongside the rows so
//! that outer-join null fill is schema-driven: a LEFT fill draws its nulls
//! from the joined table's schema, a RIGHT fill from the accumulated
//! left-side layout. Neither depends on any row actually existing.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::sql::ast::{JoinClause, JoinKind};
use crate::storage::{Row, Table, Value};

/// Clone the base table's rows, exposing every column under both its bare
/// name and its `table.column` qualified name.
pub fn qualified_base_rows(table_name: &str, table: &Table) -> Vec<Row> {
    table
        .rows()
        .iter()
        .map(|row| {
            let mut qualified = row.clone();
            for (column, value) in row.iter() {
                qualified.set(format!("{}.{}", table_name, column), value.clone());
            }
            qualified
        })
        .collect()
}

/// The column layout of the base table's working set: every column under
/// its bare name and its qualified name.
pub fn base_columns(table_name: &str, table: &Table) -> Vec<String> {
    let mut columns = Vec::new();
    for name in table.schema().column_names() {
        columns.push(name.to_string());
        columns.push(format!("{}.{}", table_name, name));
    }
    columns
}

/// Apply one join clause to the current row sequence.
///
/// `left_columns` is the layout of the incoming rows; the returned pair is
/// the joined rows together with the extended layout.
pub fn apply_join(
    left_rows: Vec<Row>,
    left_columns: &[String],
    join: &JoinClause,
    catalog: &Catalog,
) -> Result<(Vec<Row>, Vec<String>)> {
    let right_table = catalog.table(&join.table)?;
    let label = join.alias.as_deref().unwrap_or(&join.table);

    // The ON predicate names the joined table on one side; the other side
    // resolves against the current row sequence.
    let (left_ref, right_ref) = if join.on_left.table == label || join.on_left.table == join.table
    {
        (&join.on_right, &join.on_left)
    } else {
        (&join.on_left, &join.on_right)
    };
    let left_key = format!("{}.{}", left_ref.table, left_ref.column);

    let right_rows = right_table.rows();
    let mut matched_right = vec![false; right_rows.len()];
    let mut result = Vec::new();

    for left_row in &left_rows {
        let left_value = left_row
            .get(&left_key)
            .or_else(|| left_row.get(&left_ref.column))
            .cloned()
            .unwrap_or(Value::Null);

        let mut matched = false;
        for (right_pos, right_row) in right_rows.iter().enumerate() {
            let right_value = right_row.get_or_null(&right_ref.column);

            // Strict cell equality; NULL never matches, not even NULL.
            if left_value.is_null() || right_value.is_null() || left_value != right_value {
                continue;
            }

            matched = true;
            matched_right[right_pos] = true;
            result.push(combine(left_row, right_row, label));
        }

        // LEFT keeps unmatched left rows with the joined columns nulled out.
        if !matched && join.kind == JoinKind::Left {
            result.push(left_null_fill(left_row, right_table, label));
        }
    }

    // RIGHT is the symmetric of LEFT: unmatched right rows come through once
    // with every left-side slot null. The left layout supplies the slots, so
    // the fill is correct even when no left row exists at all.
    if join.kind == JoinKind::Right {
        for (right_pos, right_row) in right_rows.iter().enumerate() {
            if matched_right[right_pos] {
                continue;
            }
            let mut blank = Row::new();
            for name in left_columns {
                blank.set(name.clone(), Value::Null);
            }
            result.push(combine(&blank, right_row, label));
        }
    }

    let mut columns = left_columns.to_vec();
    for name in right_table.schema().column_names() {
        columns.push(format!("{}.{}", label, name));
        if !columns.iter().any(|existing| existing == name) {
            columns.push(name.to_string());
        }
    }

    Ok((result, columns))
}

/// Merge a right-side row into a copy of the left row. Qualified names are
/// always written; bare names only when the left row does not already carry
/// them.
fn combine(left_row: &Row, right_row: &Row, label: &str) -> Row {
    let mut combined = left_row.clone();
    for (column, value) in right_row.iter() {
        combined.set(format!("{}.{}", label, column), value.clone());
        if !combined.contains(column) {
            combined.set(column.clone(), value.clone());
        }
    }
    combined
}

/// The LEFT-join null row: every joined column slot is NULL, drawn from the
/// joined table's schema.
fn left_null_fill(left_row: &Row, right_table: &Table, label: &str) -> Row {
    let mut combined = left_row.clone();
    for column in right_table.schema().column_names() {
        combined.set(format!("{}.{}", label, column), Value::Null);
        if !combined.contains(column) {
            combined.set(column.to_string(), Value::Null);
        }
    }
    combined
}

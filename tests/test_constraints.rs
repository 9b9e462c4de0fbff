//! Constraint enforcement and mutation atomicity.

use micadb::{Error, ExecutionEngine, Row, Value};

fn rows(engine: &mut ExecutionEngine, query: &str) -> Vec<Row> {
    engine.execute(query).unwrap().rows.unwrap()
}

fn snapshot(engine: &mut ExecutionEngine, table: &str) -> Vec<Row> {
    let mut rows = rows(engine, &format!("SELECT * FROM {}", table));
    rows.sort_by(|a, b| a.get_or_null("id").total_cmp(&b.get_or_null("id")));
    rows
}

fn setup() -> ExecutionEngine {
    let mut engine = ExecutionEngine::new();
    engine
        .execute(
            "CREATE TABLE accounts (id INT PRIMARY KEY, owner VARCHAR(20) NOT NULL, \
             email VARCHAR(50) UNIQUE, balance INT)",
        )
        .unwrap();
    engine
        .execute("INSERT INTO accounts (owner, email, balance) VALUES ('ada', 'ada@x', 10)")
        .unwrap();
    engine
        .execute("INSERT INTO accounts (owner, email, balance) VALUES ('bob', 'bob@x', 20)")
        .unwrap();
    engine
}

#[test]
fn test_no_two_rows_share_unique_value() {
    let mut engine = setup();

    // Across the primary key and the unique column, every duplicate path is
    // rejected.
    assert!(engine
        .execute("INSERT INTO accounts (id, owner) VALUES (1, 'eve')")
        .is_err());
    assert!(engine
        .execute("INSERT INTO accounts (owner, email) VALUES ('eve', 'ada@x')")
        .is_err());
    assert!(engine
        .execute("UPDATE accounts SET email = 'ada@x' WHERE id = 2")
        .is_err());

    let all = snapshot(&mut engine, "accounts");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].get("email"), Some(&Value::Varchar("ada@x".to_string())));
    assert_eq!(all[1].get("email"), Some(&Value::Varchar("bob@x".to_string())));
}

#[test]
fn test_unique_column_admits_multiple_nulls() {
    let mut engine = setup();
    engine
        .execute("INSERT INTO accounts (owner) VALUES ('carol')")
        .unwrap();
    engine
        .execute("INSERT INTO accounts (owner) VALUES ('dave')")
        .unwrap();

    assert_eq!(snapshot(&mut engine, "accounts").len(), 4);
}

#[test]
fn test_rejected_insert_leaves_state_unchanged() {
    let mut engine = setup();
    let before = snapshot(&mut engine, "accounts");

    // The email index accepts 'new@x' before the primary key collides on 1;
    // the whole insert must unwind.
    let result = engine.execute(
        "INSERT INTO accounts (id, owner, email) VALUES (1, 'eve', 'new@x')",
    );
    assert!(matches!(result, Err(Error::DuplicateValue { .. })));

    assert_eq!(snapshot(&mut engine, "accounts"), before);

    // No stale posting survived: 'new@x' is still free.
    engine
        .execute("INSERT INTO accounts (owner, email) VALUES ('eve', 'new@x')")
        .unwrap();
    assert_eq!(
        rows(&mut engine, "SELECT * FROM accounts WHERE email = 'new@x'").len(),
        1
    );
}

#[test]
fn test_rejected_update_leaves_state_unchanged() {
    let mut engine = setup();
    let before = snapshot(&mut engine, "accounts");

    let result = engine.execute("UPDATE accounts SET email = 'ada@x', balance = 99");
    assert!(result.is_err());

    assert_eq!(snapshot(&mut engine, "accounts"), before);
    // Index lookups still resolve the pre-call values.
    assert_eq!(
        rows(&mut engine, "SELECT * FROM accounts WHERE email = 'bob@x'").len(),
        1
    );
}

#[test]
fn test_rejected_mutations_by_type_and_length() {
    let mut engine = setup();
    let before = snapshot(&mut engine, "accounts");

    for query in [
        "INSERT INTO accounts (owner, balance) VALUES ('eve', 'rich')",
        "INSERT INTO accounts (owner) VALUES (42)",
        "INSERT INTO accounts (owner, email) VALUES ('eve', 'this-email-is-way-beyond-fifty-characters-long@example.com')",
        "UPDATE accounts SET owner = NULL WHERE id = 1",
        "UPDATE accounts SET balance = 'lots' WHERE id = 1",
    ] {
        assert!(engine.execute(query).is_err(), "expected failure: {}", query);
        assert_eq!(snapshot(&mut engine, "accounts"), before, "state changed: {}", query);
    }
}

#[test]
fn test_auto_increment_exceeds_all_assigned_keys() {
    let mut engine = ExecutionEngine::new();
    engine
        .execute("CREATE TABLE t (id INT PRIMARY KEY, tag VARCHAR(10))")
        .unwrap();

    let mut assigned = Vec::new();
    for i in 0..10 {
        engine
            .execute(&format!("INSERT INTO t (tag) VALUES ('r{}')", i))
            .unwrap();
        let last = rows(&mut engine, &format!("SELECT id FROM t WHERE tag = 'r{}'", i));
        if let Some(&Value::Integer(id)) = last[0].get("id") {
            assigned.push(id);
        }
    }

    // Strictly increasing, and deletion never rewinds the counter.
    assert_eq!(assigned, (1..=10).collect::<Vec<i64>>());
    engine.execute("DELETE FROM t").unwrap();
    engine.execute("INSERT INTO t (tag) VALUES ('after')").unwrap();
    let after = rows(&mut engine, "SELECT id FROM t");
    assert_eq!(after[0].get("id"), Some(&Value::Integer(11)));
}

#[test]
fn test_index_stays_coherent_under_churn() {
    let mut engine = ExecutionEngine::new();
    engine
        .execute("CREATE TABLE t (id INT PRIMARY KEY, grp INT)")
        .unwrap();
    for i in 1..=30 {
        engine
            .execute(&format!("INSERT INTO t (grp) VALUES ({})", i % 3))
            .unwrap();
    }

    engine.execute("DELETE FROM t WHERE grp = 1").unwrap();
    engine.execute("UPDATE t SET grp = 9 WHERE grp = 2").unwrap();
    engine.execute("DELETE FROM t WHERE id <= 6").unwrap();

    // Every surviving row is still reachable through its primary key.
    let survivors = rows(&mut engine, "SELECT id FROM t");
    for row in &survivors {
        let Some(Value::Integer(id)) = row.get("id") else {
            panic!("missing id");
        };
        let by_pk = rows(&mut engine, &format!("SELECT * FROM t WHERE id = {}", id));
        assert_eq!(by_pk.len(), 1, "id {} not reachable via index", id);
    }
}

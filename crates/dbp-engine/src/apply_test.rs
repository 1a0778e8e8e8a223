use super::*;
use dbp_db::{DbError, DbResult, DuckDbBackend};
use std::cell::RefCell;

fn table_exists(db: &DuckDbBackend, name: &str) -> bool {
    db.relation_exists(name).unwrap()
}

/// Records every call and panics or fails on chosen statements.
#[derive(Default)]
struct ScriptedDb {
    calls: RefCell<Vec<String>>,
    panic_on: Option<&'static str>,
    fail_on: Option<&'static str>,
}

impl ScriptedDb {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Database for ScriptedDb {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_batch(sql).map(|_| 0)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.calls.borrow_mut().push(sql.to_string());
        if self.panic_on == Some(sql) {
            panic!("driver blew up on {sql}");
        }
        if self.fail_on == Some(sql) {
            return Err(DbError::ExecutionError(format!("rejected: {sql}")));
        }
        Ok(())
    }

    fn relation_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(false)
    }

    fn query_integers(&self, _sql: &str) -> DbResult<Vec<Option<i64>>> {
        Ok(Vec::new())
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }
}

#[test]
fn test_split_statements_trims_and_drops_empty() {
    let sql = "\n\tCREATE TABLE a (id INT);\r\n  ;INSERT INTO a VALUES (1);  \n";
    assert_eq!(
        split_statements(sql),
        vec!["CREATE TABLE a (id INT)", "INSERT INTO a VALUES (1)"]
    );
}

#[test]
fn test_split_statements_without_trailing_semicolon() {
    assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1"]);
}

#[test]
fn test_split_statements_only_delimiters() {
    assert!(split_statements(" ;\n;\t; \r\n").is_empty());
    assert!(split_statements("").is_empty());
}

#[test]
fn test_split_statements_naive_on_string_literals() {
    // `;` inside a literal splits the statement; this is a known constraint
    let parts = split_statements("INSERT INTO t VALUES ('a;b');");
    assert_eq!(parts, vec!["INSERT INTO t VALUES ('a", "b')"]);
}

#[test]
fn test_apply_commits_all_statements() {
    let db = DuckDbBackend::in_memory().unwrap();
    let count = apply_patch(
        &db,
        "CREATE TABLE users (id INTEGER);\nINSERT INTO users VALUES (1), (2);\n",
    )
    .unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        db.query_integers("SELECT CAST(COUNT(*) AS BIGINT) FROM users")
            .unwrap(),
        vec![Some(2)]
    );
}

#[test]
fn test_apply_empty_patch_is_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = apply_patch(&db, "  ;\n\t;  ").unwrap_err();
    assert!(matches!(err, ApplyError::Empty));

    // the connection is usable again: no transaction left open
    db.begin().unwrap();
    db.rollback().unwrap();
}

#[test]
fn test_apply_rolls_back_on_failed_statement() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = apply_patch(
        &db,
        "CREATE TABLE first (id INTEGER); INSERT INTO missing_table VALUES (1);",
    )
    .unwrap_err();

    match err {
        ApplyError::Statement {
            index, statement, ..
        } => {
            assert_eq!(index, 2);
            assert_eq!(statement, "INSERT INTO missing_table VALUES (1)");
        }
        other => panic!("expected statement error, got {other:?}"),
    }
    assert!(!table_exists(&db, "first"));
}

#[test]
fn test_apply_stops_at_first_failure() {
    let db = ScriptedDb {
        fail_on: Some("B"),
        ..Default::default()
    };
    let err = apply_patch(&db, "A; B; C;").unwrap_err();
    assert!(matches!(err, ApplyError::Statement { index: 2, .. }));
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION", "A", "B", "ROLLBACK"]);
}

#[test]
fn test_apply_empty_rolls_back_without_executing() {
    let db = ScriptedDb::default();
    let err = apply_patch(&db, "\n;\n").unwrap_err();
    assert!(matches!(err, ApplyError::Empty));
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION", "ROLLBACK"]);
}

#[test]
fn test_apply_converts_panic_and_rolls_back() {
    let db = ScriptedDb {
        panic_on: Some("B"),
        ..Default::default()
    };
    let err = apply_patch(&db, "A; B; C;").unwrap_err();
    match err {
        ApplyError::Panic(msg) => assert!(msg.contains("driver blew up on B"), "{msg}"),
        other => panic!("expected panic error, got {other:?}"),
    }
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION", "A", "B", "ROLLBACK"]);
}

#[test]
fn test_apply_commit_failure_rolls_back() {
    let db = ScriptedDb {
        fail_on: Some("COMMIT"),
        ..Default::default()
    };
    let err = apply_patch(&db, "A;").unwrap_err();
    assert!(matches!(err, ApplyError::Transaction(_)));
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION", "A", "COMMIT", "ROLLBACK"]);
}

#[test]
fn test_apply_begin_failure_executes_nothing() {
    let db = ScriptedDb {
        fail_on: Some("BEGIN TRANSACTION"),
        ..Default::default()
    };
    let err = apply_patch(&db, "A;").unwrap_err();
    assert!(matches!(err, ApplyError::Transaction(_)));
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION"]);
}

#[test]
fn test_apply_success_commits() {
    let db = ScriptedDb::default();
    assert_eq!(apply_patch(&db, "A;\nB").unwrap(), 2);
    assert_eq!(db.calls(), vec!["BEGIN TRANSACTION", "A", "B", "COMMIT"]);
}

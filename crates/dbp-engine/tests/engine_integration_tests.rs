//! Integration tests for the patch engine against file-backed databases.
//!
//! These tests open databases through `dbp_db::open`, the same path the CLI
//! takes, and inject faults with a wrapping `Database`.

use dbp_core::{Config, DatabaseConfig, PatchNumber};
use dbp_db::{Database, DbError, DbResult};
use dbp_engine::{Ledger, PatchEngine, PatchError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────────────

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("patches")).unwrap();
        Self { dir }
    }

    fn add_patch(&self, name: &str, sql: &str) {
        fs::write(self.dir.path().join("patches").join(name), sql).unwrap();
    }

    fn config(&self) -> Config {
        Config {
            patch_dir: self.dir.path().join("patches"),
            ledger_table: "patch".to_string(),
            database: DatabaseConfig {
                path: self.db_path().display().to_string(),
                ..DatabaseConfig::default()
            },
        }
    }

    fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("app.duckdb")
    }
}

fn current(db: &dyn Database) -> PatchNumber {
    Ledger::new(db, "patch").current_patch().unwrap()
}

/// Delegates to a real database but fails any statement starting with
/// `fail_prefix`.
struct FailingDb {
    inner: Box<dyn Database>,
    fail_prefix: &'static str,
}

impl FailingDb {
    fn check(&self, sql: &str) -> DbResult<()> {
        if sql.starts_with(self.fail_prefix) {
            Err(DbError::ExecutionError(format!("injected failure: {sql}")))
        } else {
            Ok(())
        }
    }
}

impl Database for FailingDb {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.check(sql)?;
        self.inner.execute(sql)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.check(sql)?;
        self.inner.execute_batch(sql)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name)
    }

    fn query_integers(&self, sql: &str) -> DbResult<Vec<Option<i64>>> {
        self.inner.query_integers(sql)
    }

    fn db_type(&self) -> &'static str {
        self.inner.db_type()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_progress_persists_across_connections() {
    let ws = Workspace::new();
    ws.add_patch("0001_users.sql", "CREATE TABLE users (id INTEGER, name VARCHAR);");
    ws.add_patch(
        "0002_seed.sql",
        "INSERT INTO users VALUES (1, 'ada');\nINSERT INTO users VALUES (2, 'grace');",
    );
    let config = ws.config();

    {
        let db = dbp_db::open(&config.database).unwrap();
        let summary = PatchEngine::new(db.as_ref(), &config).run().unwrap();
        assert_eq!(summary.current, PatchNumber::new(2));
    }

    ws.add_patch("0003_more.sql", "INSERT INTO users VALUES (3, 'edsger');");

    let db = dbp_db::open(&config.database).unwrap();
    assert_eq!(current(db.as_ref()), PatchNumber::new(2));

    let summary = PatchEngine::new(db.as_ref(), &config).run().unwrap();
    assert!(!summary.bootstrapped);
    assert_eq!(summary.initial, PatchNumber::new(2));
    assert_eq!(summary.current, PatchNumber::new(3));
    assert_eq!(
        db.query_integers("SELECT CAST(COUNT(*) AS BIGINT) FROM users")
            .unwrap(),
        vec![Some(3)]
    );
}

#[test]
fn test_rolled_back_patch_leaves_no_trace_on_disk() {
    let ws = Workspace::new();
    ws.add_patch(
        "0001_half.sql",
        "CREATE TABLE half (id INTEGER);\nTHIS IS NOT SQL;",
    );
    let config = ws.config();

    {
        let db = dbp_db::open(&config.database).unwrap();
        let err = PatchEngine::new(db.as_ref(), &config).run().unwrap_err();
        assert!(matches!(err, PatchError::Apply { .. }));
    }

    let db = dbp_db::open(&config.database).unwrap();
    assert!(!db.relation_exists("half").unwrap());
    assert_eq!(current(db.as_ref()), PatchNumber::ZERO);
}

#[test]
fn test_ledger_advance_failure_after_commit() {
    let ws = Workspace::new();
    ws.add_patch("0001_users.sql", "CREATE TABLE users (id INTEGER);");
    ws.add_patch("0002_orders.sql", "CREATE TABLE orders (id INTEGER);");
    let config = ws.config();

    let inner = dbp_db::open(&config.database).unwrap();
    Ledger::new(inner.as_ref(), "patch").init().unwrap();
    let db = FailingDb {
        inner,
        fail_prefix: "UPDATE patch",
    };

    let err = PatchEngine::new(&db, &config).run().unwrap_err();

    match err {
        PatchError::LedgerAdvanceAfterApply { number, source, .. } => {
            assert_eq!(number, PatchNumber::new(1));
            assert!(matches!(*source, PatchError::LedgerWrite { .. }));
        }
        other => panic!("expected advance error, got {other:?}"),
    }
    // the patch itself committed, the ledger did not move, and the run stopped
    assert!(db.relation_exists("users").unwrap());
    assert!(!db.relation_exists("orders").unwrap());
    assert_eq!(current(&db), PatchNumber::ZERO);
}

#[test]
fn test_bootstrap_failure_is_fatal() {
    let ws = Workspace::new();
    ws.add_patch("0001_users.sql", "CREATE TABLE users (id INTEGER);");
    let config = ws.config();

    let db = FailingDb {
        inner: dbp_db::open(&config.database).unwrap(),
        fail_prefix: "CREATE TABLE patch",
    };

    let err = PatchEngine::new(&db, &config).run().unwrap_err();

    assert!(matches!(err, PatchError::LedgerInit { .. }));
    assert!(!db.relation_exists("patch").unwrap());
    assert!(!db.relation_exists("users").unwrap());
}

#[test]
fn test_named_schema_holds_ledger() {
    let ws = Workspace::new();
    ws.add_patch("0001_users.sql", "CREATE TABLE users (id INTEGER);");
    {
        let setup = dbp_db::open(&ws.config().database).unwrap();
        setup.execute_batch("CREATE SCHEMA app").unwrap();
    }

    let mut config = ws.config();
    config.database.name = Some("app".to_string());

    let db = dbp_db::open(&config.database).unwrap();
    PatchEngine::new(db.as_ref(), &config).run().unwrap();

    assert!(db.relation_exists("app.patch").unwrap());
    assert!(db.relation_exists("app.users").unwrap());
    assert!(!db.relation_exists("main.patch").unwrap());
}

#[test]
fn test_no_patches_on_fresh_database_still_creates_ledger() {
    let ws = Workspace::new();
    let config = ws.config();
    let db = dbp_db::open(&config.database).unwrap();

    let err = PatchEngine::new(db.as_ref(), &config).run().unwrap_err();

    assert!(matches!(err, PatchError::NoPatchesFound { .. }));
    assert_eq!(current(db.as_ref()), PatchNumber::ZERO);
    assert!(Path::new(&config.database.path).exists());
}

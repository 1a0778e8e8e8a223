//! Transactional application of one patch's SQL text.
//!
//! The text is split on `;` with no awareness of SQL quoting: a `;` inside a
//! string literal or a routine body splits the statement there. Patch authors
//! must keep such statements free of semicolons.

use crate::error::ApplyError;
use dbp_db::Database;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

const TRIM_CHARS: &[char] = &['\n', '\r', ' ', '\t'];

/// Split SQL text into trimmed, non-empty statements in file order.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(|stmt| stmt.trim_matches(TRIM_CHARS))
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Apply `sql` inside a single transaction.
///
/// Statements run in order and execution stops at the first failure. The
/// transaction commits only if at least one statement ran and none failed;
/// on any error, a panic included, it is rolled back before returning.
/// Returns the number of statements executed.
pub fn apply_patch(db: &dyn Database, sql: &str) -> Result<usize, ApplyError> {
    let statements = split_statements(sql);

    db.begin().map_err(ApplyError::Transaction)?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<usize, ApplyError> {
        let count = execute_statements(db, &statements)?;
        db.commit().map_err(ApplyError::Transaction)?;
        Ok(count)
    }))
    .unwrap_or_else(|payload| Err(ApplyError::Panic(panic_message(payload.as_ref()))));

    if outcome.is_err() {
        if let Err(e) = db.rollback() {
            log::warn!("Rollback failed: {e}");
        }
    }
    outcome
}

fn execute_statements(db: &dyn Database, statements: &[&str]) -> Result<usize, ApplyError> {
    if statements.is_empty() {
        return Err(ApplyError::Empty);
    }
    for (i, stmt) in statements.iter().enumerate() {
        log::debug!("Executing statement {}/{}", i + 1, statements.len());
        // execute_batch tolerates statements that return rows
        db.execute_batch(stmt)
            .map_err(|source| ApplyError::Statement {
                index: i + 1,
                statement: (*stmt).to_string(),
                source,
            })?;
    }
    Ok(statements.len())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "apply_test.rs"]
mod tests;

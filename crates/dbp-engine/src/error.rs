//! Error types for the patch engine.

use dbp_core::PatchNumber;
use dbp_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while applying one patch's SQL text.
///
/// Every variant is returned after the transaction has been rolled back.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// A statement failed; `index` is 1-based in file order (A001).
    #[error("[A001] Statement {index} failed: {source}")]
    Statement {
        index: usize,
        statement: String,
        #[source]
        source: DbError,
    },

    /// The text held no statements once split and trimmed (A002).
    #[error("[A002] Patch contains no SQL statements")]
    Empty,

    /// Statement execution panicked (A003).
    #[error("[A003] Panic while applying patch: {0}")]
    Panic(String),

    /// BEGIN or COMMIT failed (A004).
    #[error("[A004] Transaction failed: {0}")]
    Transaction(#[source] DbError),
}

/// Patch engine errors.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The ledger table does not exist yet (P001).
    #[error("[P001] Patch table '{table}' does not exist")]
    LedgerMissing { table: String },

    /// The ledger could not be read (P002).
    #[error("[P002] Failed to read patch table '{table}': {source}")]
    LedgerRead {
        table: String,
        #[source]
        source: DbError,
    },

    /// The ledger exists but does not hold exactly one usable value (P003).
    #[error("[P003] Patch table '{table}' is corrupt: {reason}")]
    LedgerCorrupt { table: String, reason: String },

    /// Creating the ledger table failed (P004).
    #[error("[P004] Failed to create patch table '{table}': {source}")]
    LedgerInit {
        table: String,
        #[source]
        source: ApplyError,
    },

    /// Writing the ledger value failed (P005).
    #[error("[P005] Failed to set patch table '{table}' to {number}: {source}")]
    LedgerWrite {
        table: String,
        number: PatchNumber,
        #[source]
        source: DbError,
    },

    /// The ledger update touched a row count other than one (P006).
    #[error("[P006] Setting patch table '{table}' to {number} updated {rows} rows, expected 1")]
    LedgerRowCount {
        table: String,
        number: PatchNumber,
        rows: usize,
    },

    /// The patch directory held no patch files (P007).
    #[error("[P007] No patches found in {}", .dir.display())]
    NoPatchesFound { dir: PathBuf },

    /// Several pending files claim the same number (P008).
    #[error("[P008] Duplicate patch #{number}: {paths:?}")]
    DuplicatePatch {
        number: PatchNumber,
        paths: Vec<PathBuf>,
    },

    /// A patch file could not be read (P009).
    #[error("[P009] Failed to read patch #{number} ({}): {source}", .path.display())]
    PatchFileRead {
        number: PatchNumber,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A patch failed and was rolled back (P010).
    #[error("[P010] Patch #{number} ({}) failed: {source}", .path.display())]
    Apply {
        number: PatchNumber,
        path: PathBuf,
        #[source]
        source: ApplyError,
    },

    /// The patch committed but the ledger was not advanced (P011).
    ///
    /// The database now holds the patch's changes while the ledger still
    /// names the previous patch; rerunning would apply it a second time.
    #[error(
        "[P011] Patch #{number} ({}) was committed but the patch table was not updated: {source}",
        .path.display()
    )]
    LedgerAdvanceAfterApply {
        number: PatchNumber,
        path: PathBuf,
        #[source]
        source: Box<PatchError>,
    },
}

/// Result type alias for [`PatchError`].
pub type PatchResult<T> = Result<T, PatchError>;

//! Patch engine for db-patch.
//!
//! Reads the current patch number from the ledger table, walks the patch
//! catalog from the next number upward, and applies each file inside its own
//! transaction, advancing the ledger after every commit.

pub mod apply;
pub mod engine;
pub mod error;
pub mod ledger;

pub use apply::{apply_patch, split_statements};
pub use engine::{AppliedPatch, PatchEngine, PatchPlan, RunSummary};
pub use error::{ApplyError, PatchError, PatchResult};
pub use ledger::Ledger;

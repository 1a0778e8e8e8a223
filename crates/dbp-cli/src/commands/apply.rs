//! Apply command implementation

use anyhow::Result;
use dbp_engine::{PatchEngine, RunSummary};
use std::io::{self, Write};

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the apply command
pub fn execute(global: &GlobalArgs) -> Result<RunSummary> {
    let ctx = RuntimeContext::new(global)?;
    let summary = PatchEngine::new(ctx.db.as_ref(), &ctx.config).run()?;
    Ok(summary)
}

/// Print the outcome of a successful run to stdout
pub fn report(summary: &RunSummary) -> Result<()> {
    let mut out = io::stdout().lock();
    write_summary(summary, &mut out)
}

fn write_summary(summary: &RunSummary, out: &mut impl Write) -> Result<()> {
    if summary.bootstrapped {
        writeln!(out, "Created patch table")?;
    }
    for patch in &summary.applied {
        writeln!(
            out,
            "  #{:<6} {} ({} statements, {}ms)",
            patch.number,
            patch.path.display(),
            patch.statements,
            patch.elapsed.as_millis()
        )?;
    }
    if summary.applied.is_empty() {
        writeln!(out, "Up to date at patch #{}", summary.current)?;
    } else {
        writeln!(
            out,
            "Applied {} patch(es): #{} -> #{}",
            summary.applied.len(),
            summary.initial,
            summary.current
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "apply_test.rs"]
mod tests;

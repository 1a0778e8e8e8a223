//! Status command implementation

use anyhow::{Context, Result};
use dbp_engine::{PatchEngine, PatchPlan};
use std::io::{self, Write};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::context::RuntimeContext;

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let plan = PatchEngine::new(ctx.db.as_ref(), &ctx.config).plan()?;

    let mut out = io::stdout().lock();
    match args.output {
        StatusOutput::Text => write_text(&plan, &ctx.config.ledger_table, &mut out)?,
        StatusOutput::Json => {
            serde_json::to_writer_pretty(&mut out, &plan).context("Failed to write JSON")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_text(plan: &PatchPlan, table: &str, out: &mut impl Write) -> Result<()> {
    match plan.current {
        Some(number) => writeln!(out, "Current patch: #{number}")?,
        None => writeln!(
            out,
            "Current patch: none (patch table '{table}' does not exist yet)"
        )?,
    }
    writeln!(out, "Patch files:   {}", plan.available)?;

    if plan.pending.is_empty() {
        writeln!(out, "Pending:       none, up to date")?;
    } else {
        writeln!(out, "Pending:       {}", plan.pending.len())?;
        for file in &plan.pending {
            writeln!(out, "  #{:<6} {}", file.number, file.path.display())?;
        }
    }

    if !plan.unreachable.is_empty() {
        writeln!(
            out,
            "Unreachable:   {} (numbered after a gap, apply stops before them)",
            plan.unreachable.len()
        )?;
        for file in &plan.unreachable {
            writeln!(out, "  #{:<6} {}", file.number, file.path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;

//! List command implementation

use anyhow::{Context, Result};
use dbp_core::{catalog, PatchFile, PatchNumber, PatchSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::context::load_config;

/// JSON shape of the ls output
#[derive(Serialize)]
struct Listing<'a> {
    patches: Vec<&'a PatchFile>,
    duplicates: &'a BTreeMap<PatchNumber, Vec<PathBuf>>,
}

/// Execute the ls command
///
/// Works from the patch directory alone; the database is never opened.
pub fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let patches = catalog::try_scan(&config.patch_dir).context("Failed to list patches")?;

    let mut out = io::stdout().lock();
    match args.output {
        LsOutput::Table => write_table(&patches, &mut out)?,
        LsOutput::Json => write_json(&patches, &mut out)?,
    }
    Ok(())
}

fn write_table(patches: &PatchSet, out: &mut impl Write) -> Result<()> {
    if patches.is_empty() {
        writeln!(out, "No patches found")?;
        return Ok(());
    }

    let number_width = patches
        .iter()
        .map(|f| f.number.to_string().len())
        .max()
        .unwrap_or(5)
        .max(5);

    writeln!(out, "{:<number_width$}  PATH", "PATCH")?;
    writeln!(out, "{:-<number_width$}  {}", "", "-".repeat(40))?;
    for file in patches.iter() {
        writeln!(out, "{:<number_width$}  {}", file.number, file.path.display())?;
        if let Some(others) = patches.duplicates().get(&file.number) {
            for path in others {
                writeln!(
                    out,
                    "{:<number_width$}  {} (duplicate, ignored)",
                    file.number,
                    path.display()
                )?;
            }
        }
    }
    writeln!(out)?;
    writeln!(out, "{} patches", patches.len())?;
    Ok(())
}

fn write_json(patches: &PatchSet, out: &mut impl Write) -> Result<()> {
    let listing = Listing {
        patches: patches.iter().collect(),
        duplicates: patches.duplicates(),
    };
    serde_json::to_writer_pretty(&mut *out, &listing).context("Failed to write JSON")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[path = "ls_test.rs"]
mod tests;

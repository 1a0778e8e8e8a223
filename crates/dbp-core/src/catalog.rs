//! Patch file discovery
//!
//! A patch file is named `NNNN<rest>.sql`: a 4-character numeric prefix that
//! parses to a patch number of at least 1, a non-empty remainder, and a
//! case-sensitive `.sql` suffix. Only the direct children of the patch
//! directory are considered.

use crate::error::{CoreError, CoreResult};
use crate::patch_number::PatchNumber;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Required file name suffix for patch files.
pub const PATCH_SUFFIX: &str = ".sql";

/// Shortest accepted file name: 4-digit prefix, one character, `.sql`.
pub const MIN_FILE_NAME_LEN: usize = 8;

/// A patch file discovered in the patch directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchFile {
    /// Number parsed from the file name prefix
    pub number: PatchNumber,

    /// Full path to the file
    pub path: PathBuf,
}

impl PatchFile {
    /// Read the raw SQL text of the patch.
    pub fn read_sql(&self) -> std::io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// Patch files keyed by number, built fresh on every run.
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    patches: BTreeMap<PatchNumber, PatchFile>,
    duplicates: BTreeMap<PatchNumber, Vec<PathBuf>>,
}

impl PatchSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a patch file.
    ///
    /// The first file registered for a number wins; later claims are kept in
    /// [`duplicates`](Self::duplicates) and `false` is returned.
    pub fn insert(&mut self, file: PatchFile) -> bool {
        if self.patches.contains_key(&file.number) {
            self.duplicates
                .entry(file.number)
                .or_default()
                .push(file.path);
            return false;
        }
        self.patches.insert(file.number, file);
        true
    }

    /// Look up the file for a patch number
    pub fn get(&self, number: PatchNumber) -> Option<&PatchFile> {
        self.patches.get(&number)
    }

    /// Number of distinct patch numbers
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Whether no patch files were found
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// All patch files in ascending number order
    pub fn iter(&self) -> impl Iterator<Item = &PatchFile> {
        self.patches.values()
    }

    /// Paths that lost a number collision, keyed by the contested number
    pub fn duplicates(&self) -> &BTreeMap<PatchNumber, Vec<PathBuf>> {
        &self.duplicates
    }

    /// Patches that follow `version` without a gap.
    ///
    /// Yields `version + 1`, `version + 2`, ... and stops at the first
    /// number with no file, so `{1, 2, 3, 5}` after version 2 yields only 3.
    pub fn walk_from(&self, version: PatchNumber) -> impl Iterator<Item = &PatchFile> + '_ {
        std::iter::successors(version.next(), |n| n.next()).map_while(move |n| self.get(n))
    }
}

/// Outcome of inspecting one directory entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// A well-formed patch file name
    Patch(PatchNumber),
    /// Too short or not `.sql`; skipped without comment
    Ignored,
    /// Looks like a patch file but the prefix is not a positive integer
    BadPrefix,
}

pub(crate) fn classify_file_name(name: &str) -> EntryKind {
    if name.len() < MIN_FILE_NAME_LEN || !name.ends_with(PATCH_SUFFIX) {
        return EntryKind::Ignored;
    }
    match PatchNumber::from_file_prefix(name) {
        Some(number) => EntryKind::Patch(number),
        None => EntryKind::BadPrefix,
    }
}

/// Scan `dir` for patch files.
///
/// Never fails: an unreadable directory is logged and yields an empty set,
/// and the caller decides whether that is fatal.
pub fn scan(dir: &Path) -> PatchSet {
    match try_scan(dir) {
        Ok(set) => set,
        Err(e) => {
            log::error!("{e}");
            PatchSet::new()
        }
    }
}

/// Scan `dir` for patch files, reporting an unreadable directory as an error.
pub fn try_scan(dir: &Path) -> CoreResult<PatchSet> {
    let entries = fs::read_dir(dir).map_err(|e| CoreError::PatchDirUnreadable {
        path: dir.display().to_string(),
        source: e,
    })?;

    // Sorted so that duplicate resolution does not depend on readdir order
    let mut names: Vec<OsString> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.path().is_dir() {
            continue;
        }
        names.push(entry.file_name());
    }
    names.sort();

    let mut set = PatchSet::new();
    for name in names {
        let Some(name_str) = name.to_str() else {
            let lossy = name.to_string_lossy();
            if classify_file_name(&lossy) != EntryKind::Ignored {
                log::warn!(
                    "Cannot parse patch id: {} in {} (file name is not UTF-8)",
                    lossy,
                    dir.display()
                );
            }
            continue;
        };

        match classify_file_name(name_str) {
            EntryKind::Ignored => {}
            EntryKind::BadPrefix => {
                log::warn!("Cannot parse patch id: {} in {}", name_str, dir.display());
            }
            EntryKind::Patch(number) => {
                let path = dir.join(name_str);
                if !set.insert(PatchFile {
                    number,
                    path: path.clone(),
                }) {
                    let kept = set.get(number).map(|f| f.path.display().to_string());
                    log::warn!(
                        "Duplicate patch #{}: {} ignored, keeping {}",
                        number,
                        path.display(),
                        kept.unwrap_or_default()
                    );
                }
            }
        }
    }

    log::debug!("Found {} patch files in {}", set.len(), dir.display());
    Ok(set)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

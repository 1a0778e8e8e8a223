//! Strongly-typed patch number wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number identifying one migration step.
///
/// Patch files carry numbers from 1 upward; the ledger stores `0` until the
/// first patch has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchNumber(u32);

impl PatchNumber {
    /// Ledger value before any patch has been applied.
    pub const ZERO: PatchNumber = PatchNumber(0);

    /// Wrap a raw patch number.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Return the underlying integer.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The patch that follows this one, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Parse a patch number out of the fixed-width prefix of a file name.
    ///
    /// The first 4 characters must form an integer of at least 1. Leading
    /// zeros are accepted (`0007` is patch 7).
    pub fn from_file_prefix(name: &str) -> Option<Self> {
        let prefix = name.get(..4)?;
        match prefix.parse::<i64>() {
            Ok(n) if n >= 1 => u32::try_from(n).ok().map(Self),
            _ => None,
        }
    }
}

impl fmt::Display for PatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for PatchNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<PatchNumber> for u32 {
    fn from(value: PatchNumber) -> Self {
        value.0
    }
}

impl TryFrom<i64> for PatchNumber {
    type Error = std::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self)
    }
}

#![deny(missing_docs)]
#![doc = "Core error, identifier and RNG types shared by the knit circuit cutting crates."]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, KnitError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::SampleBudget;

/// Identity shared by every occurrence of one logical cut.
///
/// In a partitioned circuit each side of a cut carries its own one-party
/// marker; markers with the same identity are sampled jointly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CutId(u64);

impl CutId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }

    /// Parses the identity from a `<free-text>_<integer-id>` label suffix.
    ///
    /// The text after the last underscore must be an unsigned integer. A label
    /// without underscores is read as a bare integer.
    pub fn from_label_suffix(label: &str) -> Option<Self> {
        let suffix = label.rsplit('_').next()?;
        suffix.parse().ok()
    }
}

impl fmt::Display for CutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CutId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(CutId)
    }
}

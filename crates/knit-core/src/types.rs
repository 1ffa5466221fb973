use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KnitError};

/// Number of samples to draw from a joint quasi-probability distribution.
///
/// `Unbounded` requests exact enumeration of every joint choice instead of
/// Monte Carlo sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleBudget {
    /// A finite number of Monte Carlo samples.
    Finite(u64),
    /// Exact enumeration; no randomness is involved.
    Unbounded,
}

impl SampleBudget {
    /// Returns an error unless the budget allows at least one sample.
    pub fn validate(&self) -> Result<(), KnitError> {
        match self {
            SampleBudget::Finite(0) => Err(KnitError::Cutting(
                ErrorInfo::new("num-samples-too-small", "num_samples must be at least 1")
                    .with_context("num_samples", 0),
            )),
            _ => Ok(()),
        }
    }

    /// Returns the budget as a float, `f64::INFINITY` when unbounded.
    pub fn as_f64(&self) -> f64 {
        match self {
            SampleBudget::Finite(n) => *n as f64,
            SampleBudget::Unbounded => f64::INFINITY,
        }
    }

    /// Returns whether exact enumeration was requested.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, SampleBudget::Unbounded)
    }
}

impl From<u64> for SampleBudget {
    fn from(value: u64) -> Self {
        SampleBudget::Finite(value)
    }
}

impl fmt::Display for SampleBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleBudget::Finite(n) => write!(f, "{n}"),
            SampleBudget::Unbounded => write!(f, "inf"),
        }
    }
}

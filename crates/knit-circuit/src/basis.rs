use knit_core::errors::{ErrorInfo, KnitError};
use serde::{Deserialize, Serialize};

use crate::gate::Gate;

const KAPPA_TOLERANCE: f64 = 1e-9;

fn basis_error(code: &str, message: impl Into<String>) -> KnitError {
    KnitError::Qpd(ErrorInfo::new(code, message.into()))
}

/// Operation applied to one party when a cut is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LocalOp {
    /// A single-qubit gate.
    Gate {
        /// Gate applied to the party's qubit.
        gate: Gate,
    },
    /// A mid-circuit measurement whose outcome feeds the reconstruction sign.
    Measure,
}

impl LocalOp {
    /// Shorthand for a gate operation.
    pub fn gate(gate: Gate) -> Self {
        LocalOp::Gate { gate }
    }
}

/// Alternative local operations for one party, applied in order.
pub type PartyOps = Vec<LocalOp>;

/// Quasi-probability decomposition of one cut.
///
/// Each alternative ("map") is a tuple with one operation sequence per party.
/// The overhead factor `kappa` is the 1-norm of the coefficients and the
/// sampling probability of alternative `i` is `|coeffs[i]| / kappa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializableBasis", into = "SerializableBasis")]
pub struct QpdBasis {
    maps: Vec<Vec<PartyOps>>,
    coeffs: Vec<f64>,
    probabilities: Vec<f64>,
    kappa: f64,
}

impl QpdBasis {
    /// Builds a basis from its alternatives and their real coefficients.
    pub fn new(maps: Vec<Vec<PartyOps>>, coeffs: Vec<f64>) -> Result<Self, KnitError> {
        if maps.is_empty() {
            return Err(basis_error(
                "empty-basis",
                "a QPD basis needs at least one alternative",
            ));
        }
        if maps.len() != coeffs.len() {
            return Err(KnitError::Qpd(
                ErrorInfo::new(
                    "basis-length-mismatch",
                    "number of maps and coefficients differ",
                )
                .with_context("maps", maps.len())
                .with_context("coeffs", coeffs.len()),
            ));
        }
        let num_parties = maps[0].len();
        if !(1..=2).contains(&num_parties) {
            return Err(KnitError::Qpd(
                ErrorInfo::new("invalid-party-count", "maps must act on one or two parties")
                    .with_context("parties", num_parties),
            ));
        }
        for (idx, map) in maps.iter().enumerate() {
            if map.len() != num_parties {
                return Err(KnitError::Qpd(
                    ErrorInfo::new(
                        "inconsistent-party-count",
                        "all maps must act on the same number of parties",
                    )
                    .with_context("map_index", idx)
                    .with_context("expected", num_parties)
                    .with_context("found", map.len()),
                ));
            }
            for op in map.iter().flatten() {
                if let LocalOp::Gate { gate } = op {
                    if gate.num_qubits() != 1 {
                        return Err(KnitError::Qpd(
                            ErrorInfo::new(
                                "non-local-operation",
                                "maps may only contain single-qubit operations",
                            )
                            .with_context("map_index", idx)
                            .with_context("gate", gate.name()),
                        ));
                    }
                }
            }
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(basis_error(
                "non-finite-coefficient",
                "basis coefficients must be finite",
            ));
        }
        let kappa: f64 = coeffs.iter().map(|c| c.abs()).sum();
        if kappa < 1.0 - KAPPA_TOLERANCE {
            return Err(KnitError::Qpd(
                ErrorInfo::new("kappa-below-one", "sum of |coefficients| must be at least 1")
                    .with_context("kappa", kappa),
            ));
        }
        let probabilities = coeffs.iter().map(|c| c.abs() / kappa).collect();
        Ok(Self {
            maps,
            coeffs,
            probabilities,
            kappa,
        })
    }

    /// All alternatives of the decomposition.
    pub fn maps(&self) -> &[Vec<PartyOps>] {
        &self.maps
    }

    /// Operation sequences of one alternative, one per party.
    pub fn map(&self, alternative: usize) -> Option<&[PartyOps]> {
        self.maps.get(alternative).map(Vec::as_slice)
    }

    /// Real coefficient of each alternative.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Sampling probability of each alternative.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Sampling overhead of this cut.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Number of alternatives.
    pub fn num_alternatives(&self) -> usize {
        self.maps.len()
    }

    /// Number of parties (qubits) each alternative acts on.
    pub fn num_parties(&self) -> usize {
        self.maps[0].len()
    }
}

/// Wire form of a [`QpdBasis`]; derived fields are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableBasis {
    maps: Vec<Vec<PartyOps>>,
    coeffs: Vec<f64>,
}

impl TryFrom<SerializableBasis> for QpdBasis {
    type Error = KnitError;

    fn try_from(value: SerializableBasis) -> Result<Self, Self::Error> {
        QpdBasis::new(value.maps, value.coeffs)
    }
}

impl From<QpdBasis> for SerializableBasis {
    fn from(value: QpdBasis) -> Self {
        Self {
            maps: value.maps,
            coeffs: value.coeffs,
        }
    }
}

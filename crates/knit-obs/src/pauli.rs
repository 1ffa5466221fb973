use std::fmt;
use std::str::FromStr;

use knit_core::errors::{ErrorInfo, KnitError};
use serde::{Deserialize, Serialize};

fn pauli_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Phase-free Pauli string stored in symplectic form.
///
/// Qubit `q` carries `X` when `x[q]` is set, `Z` when `z[q]` is set and `Y`
/// when both are. Labels are written big-endian: the rightmost character is
/// qubit 0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pauli {
    x: Vec<bool>,
    z: Vec<bool>,
}

impl Pauli {
    /// Identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            x: vec![false; num_qubits],
            z: vec![false; num_qubits],
        }
    }

    /// Builds a Pauli from its X and Z component vectors.
    pub fn from_components(x: Vec<bool>, z: Vec<bool>) -> Result<Self, KnitError> {
        if x.len() != z.len() {
            return Err(KnitError::Observable(
                pauli_error("component-length-mismatch", "x and z components differ in length")
                    .with_context("x", x.len())
                    .with_context("z", z.len()),
            ));
        }
        Ok(Self { x, z })
    }

    /// Parses a label such as `"XIZ"`, `"-iYY"` or `"+ZZ"`.
    ///
    /// One optional sign (`+`, `-`) followed by one optional `i` or `j` is
    /// accepted and dropped; measurement settings do not depend on it.
    pub fn from_label(label: &str) -> Result<Self, KnitError> {
        let body = label.strip_prefix(['+', '-']).unwrap_or(label);
        let body = body.strip_prefix(['i', 'j']).unwrap_or(body);
        if body.is_empty() {
            return Err(KnitError::Observable(
                pauli_error("empty-pauli-label", "Pauli label has no qubits")
                    .with_context("label", label),
            ));
        }
        let mut pauli = Pauli::identity(body.len());
        for (offset, ch) in body.chars().rev().enumerate() {
            let (x, z) = match ch {
                'I' => (false, false),
                'X' => (true, false),
                'Y' => (true, true),
                'Z' => (false, true),
                other => {
                    return Err(KnitError::Observable(
                        pauli_error("invalid-pauli-label", "unexpected character in Pauli label")
                            .with_context("label", label)
                            .with_context("character", other),
                    ))
                }
            };
            pauli.x[offset] = x;
            pauli.z[offset] = z;
        }
        Ok(pauli)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.x.len()
    }

    /// X component per qubit.
    pub fn x(&self) -> &[bool] {
        &self.x
    }

    /// Z component per qubit.
    pub fn z(&self) -> &[bool] {
        &self.z
    }

    /// Returns true if the operator on `qubit` is the identity.
    pub fn is_identity_at(&self, qubit: usize) -> bool {
        !self.x[qubit] && !self.z[qubit]
    }

    /// Non-identity qubits in ascending order.
    pub fn support(&self) -> Vec<usize> {
        (0..self.num_qubits())
            .filter(|&q| !self.is_identity_at(q))
            .collect()
    }

    /// Returns true when, on every qubit, one operator is the identity or
    /// both are equal.
    pub fn qubitwise_commutes(&self, other: &Pauli) -> bool {
        self.num_qubits() == other.num_qubits()
            && (0..self.num_qubits()).all(|q| {
                self.is_identity_at(q)
                    || other.is_identity_at(q)
                    || (self.x[q] == other.x[q] && self.z[q] == other.z[q])
            })
    }

    /// Per-qubit union of the X and Z components.
    pub(crate) fn absorb(&mut self, other: &Pauli) {
        for q in 0..self.num_qubits() {
            self.x[q] |= other.x[q];
            self.z[q] |= other.z[q];
        }
    }

    /// Big-endian label without phase.
    pub fn to_label(&self) -> String {
        (0..self.num_qubits())
            .rev()
            .map(|q| match (self.x[q], self.z[q]) {
                (false, false) => 'I',
                (true, false) => 'X',
                (true, true) => 'Y',
                (false, true) => 'Z',
            })
            .collect()
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_label())
    }
}

impl FromStr for Pauli {
    type Err = KnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pauli::from_label(s)
    }
}

impl TryFrom<String> for Pauli {
    type Error = KnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pauli::from_label(&value)
    }
}

impl From<Pauli> for String {
    fn from(value: Pauli) -> Self {
        value.to_label()
    }
}

/// Non-empty list of Pauli observables over a common number of qubits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pauli>", into = "Vec<Pauli>")]
pub struct PauliList {
    paulis: Vec<Pauli>,
}

impl PauliList {
    /// Wraps a list of observables after checking it is non-empty and uniform.
    pub fn new(paulis: Vec<Pauli>) -> Result<Self, KnitError> {
        let Some(first) = paulis.first() else {
            return Err(KnitError::Observable(pauli_error(
                "empty-observable-list",
                "at least one observable is required",
            )));
        };
        let num_qubits = first.num_qubits();
        if let Some((idx, pauli)) = paulis
            .iter()
            .enumerate()
            .find(|(_, pauli)| pauli.num_qubits() != num_qubits)
        {
            return Err(KnitError::Observable(
                pauli_error(
                    "inconsistent-qubit-count",
                    "observables must act on the same number of qubits",
                )
                .with_context("index", idx)
                .with_context("expected", num_qubits)
                .with_context("found", pauli.num_qubits()),
            ));
        }
        Ok(Self { paulis })
    }

    /// Parses every label and wraps the result.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, KnitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paulis = labels
            .into_iter()
            .map(|label| Pauli::from_label(label.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(paulis)
    }

    /// Number of qubits shared by every observable.
    pub fn num_qubits(&self) -> usize {
        self.paulis[0].num_qubits()
    }

    /// Number of observables.
    pub fn len(&self) -> usize {
        self.paulis.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.paulis.is_empty()
    }

    /// Observables in caller order.
    pub fn as_slice(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Iterates over the observables in caller order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pauli> {
        self.paulis.iter()
    }
}

impl TryFrom<Vec<Pauli>> for PauliList {
    type Error = KnitError;

    fn try_from(value: Vec<Pauli>) -> Result<Self, Self::Error> {
        PauliList::new(value)
    }
}

impl From<PauliList> for Vec<Pauli> {
    fn from(value: PauliList) -> Self {
        value.paulis
    }
}

impl<'a> IntoIterator for &'a PauliList {
    type Item = &'a Pauli;
    type IntoIter = std::slice::Iter<'a, Pauli>;

    fn into_iter(self) -> Self::IntoIter {
        self.paulis.iter()
    }
}

use serde::{Deserialize, Serialize};

/// Standard unitary gates understood by the circuit model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Gate {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Hadamard.
    H,
    /// Phase gate `sqrt(Z)`.
    S,
    /// Inverse phase gate.
    Sdg,
    /// `sqrt(S)`.
    T,
    /// Inverse of `T`.
    Tdg,
    /// `sqrt(X)`.
    Sx,
    /// Inverse of `Sx`.
    Sxdg,
    /// Rotation about X.
    Rx {
        /// Rotation angle in radians.
        theta: f64,
    },
    /// Rotation about Y.
    Ry {
        /// Rotation angle in radians.
        theta: f64,
    },
    /// Rotation about Z.
    Rz {
        /// Rotation angle in radians.
        theta: f64,
    },
    /// Controlled X.
    Cx,
    /// Controlled Z.
    Cz,
    /// Swap.
    Swap,
    /// Two-qubit XX rotation.
    Rxx {
        /// Rotation angle in radians.
        theta: f64,
    },
    /// Two-qubit YY rotation.
    Ryy {
        /// Rotation angle in radians.
        theta: f64,
    },
    /// Two-qubit ZZ rotation.
    Rzz {
        /// Rotation angle in radians.
        theta: f64,
    },
}

impl Gate {
    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::Cx
            | Gate::Cz
            | Gate::Swap
            | Gate::Rxx { .. }
            | Gate::Ryy { .. }
            | Gate::Rzz { .. } => 2,
            _ => 1,
        }
    }

    /// Lower case mnemonic of the gate.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::T => "t",
            Gate::Tdg => "tdg",
            Gate::Sx => "sx",
            Gate::Sxdg => "sxdg",
            Gate::Rx { .. } => "rx",
            Gate::Ry { .. } => "ry",
            Gate::Rz { .. } => "rz",
            Gate::Cx => "cx",
            Gate::Cz => "cz",
            Gate::Swap => "swap",
            Gate::Rxx { .. } => "rxx",
            Gate::Ryy { .. } => "ryy",
            Gate::Rzz { .. } => "rzz",
        }
    }
}

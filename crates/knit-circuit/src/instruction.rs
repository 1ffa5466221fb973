use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::marker::CutMarker;

/// Address of one classical bit: register index plus offset in that register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// Index of the register in the circuit's register list.
    pub register: usize,
    /// Offset of the bit within the register.
    pub index: usize,
}

impl Clbit {
    /// Creates a classical bit address.
    pub const fn new(register: usize, index: usize) -> Self {
        Self { register, index }
    }
}

/// Named classical register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    /// Register name, unique within a circuit.
    pub name: String,
    /// Number of bits.
    pub size: usize,
}

/// Operation carried by an [`Instruction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Unitary gate.
    Gate {
        /// Gate applied to the instruction qubits.
        gate: Gate,
    },
    /// Computational basis measurement into one classical bit.
    Measure,
    /// Reset to `|0>`.
    Reset,
    /// Scheduling barrier over any number of qubits.
    Barrier,
    /// Quasi-probability cut marker.
    Cut {
        /// Marker payload.
        marker: CutMarker,
    },
}

impl Operation {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Gate { gate } => gate.name(),
            Operation::Measure => "measure",
            Operation::Reset => "reset",
            Operation::Barrier => "barrier",
            Operation::Cut { .. } => "qpd_cut",
        }
    }

    /// Returns the cut marker if this operation is one.
    pub fn as_cut(&self) -> Option<&CutMarker> {
        match self {
            Operation::Cut { marker } => Some(marker),
            _ => None,
        }
    }
}

/// One operation bound to qubits and classical bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation to apply.
    pub operation: Operation,
    /// Qubits the operation acts on, in operand order.
    pub qubits: Vec<usize>,
    /// Classical bits written by the operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<Clbit>,
}

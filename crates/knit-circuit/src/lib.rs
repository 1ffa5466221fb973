#![deny(missing_docs)]

//! Circuit model used by the knit cutting pipeline.
//!
//! Circuits are flat instruction lists over numbered qubits and named classical
//! registers. Interactions that have been cut are represented by
//! [`CutMarker`] operations that carry their quasi-probability basis; a
//! two-party marker still spans both qubits of the cut, a one-party marker is
//! one side of a cut whose companion lives in another partition.

mod basis;
mod circuit;
mod gate;
mod hash;
mod instruction;
mod marker;
mod serialization;

pub use basis::{LocalOp, PartyOps, QpdBasis};
pub use circuit::Circuit;
pub use gate::Gate;
pub use hash::canonical_hash;
pub use instruction::{ClassicalRegister, Clbit, Instruction, Operation};
pub use marker::{CutMarker, MarkerKind};
pub use serialization::{circuit_from_bytes, circuit_from_json, circuit_to_bytes, circuit_to_json};

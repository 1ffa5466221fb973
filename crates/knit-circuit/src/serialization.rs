use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::instruction::{ClassicalRegister, Instruction};

/// Serializes the circuit into a binary blob.
///
/// The payload is the JSON encoding wrapped by `bincode`, since tagged
/// operation enums are not self-describing in bincode's format.
pub fn circuit_to_bytes(circuit: &Circuit) -> Result<Vec<u8>, KnitError> {
    let json = circuit_to_json(circuit)?;
    bincode::serialize(&json)
        .map_err(|err| KnitError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a circuit from its binary representation.
pub fn circuit_from_bytes(bytes: &[u8]) -> Result<Circuit, KnitError> {
    let json: String = bincode::deserialize(bytes)
        .map_err(|err| KnitError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    circuit_from_json(&json)
}

/// Serializes the circuit to a JSON string.
pub fn circuit_to_json(circuit: &Circuit) -> Result<String, KnitError> {
    serde_json::to_string_pretty(circuit)
        .map_err(|err| KnitError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a circuit from a JSON string, re-validating every instruction.
pub fn circuit_from_json(json: &str) -> Result<Circuit, KnitError> {
    serde_json::from_str(json)
        .map_err(|err| KnitError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))
}

/// Wire form of a [`Circuit`]; deserialization replays every instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableCircuit {
    #[serde(default)]
    schema_version: SchemaVersion,
    num_qubits: usize,
    #[serde(default)]
    cregs: Vec<ClassicalRegister>,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

impl TryFrom<SerializableCircuit> for Circuit {
    type Error = KnitError;

    fn try_from(value: SerializableCircuit) -> Result<Self, Self::Error> {
        if value.schema_version.major != SchemaVersion::default().major {
            return Err(KnitError::Serde(
                ErrorInfo::new("schema-version", "unsupported circuit schema version")
                    .with_context("major", value.schema_version.major),
            ));
        }
        Circuit::from_parts(value.num_qubits, value.cregs, value.instructions)
    }
}

impl From<Circuit> for SerializableCircuit {
    fn from(value: Circuit) -> Self {
        let (num_qubits, cregs, instructions) = value.into_parts();
        Self {
            schema_version: SchemaVersion::default(),
            num_qubits,
            cregs,
            instructions,
        }
    }
}

use knit_core::errors::{ErrorInfo, KnitError};
use sha2::{Digest, Sha256};

use crate::circuit::Circuit;

/// Computes the canonical structural hash for the provided circuit.
///
/// Two circuits hash equal exactly when their registers and instruction
/// streams are identical, including gate parameters and marker payloads.
pub fn canonical_hash(circuit: &Circuit) -> Result<String, KnitError> {
    let bytes = serde_json::to_vec(circuit)
        .map_err(|err| KnitError::Serde(ErrorInfo::new("hash-encode", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update((circuit.num_qubits() as u64).to_le_bytes());
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

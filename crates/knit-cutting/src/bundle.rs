use std::collections::BTreeMap;
use std::fs;
use std::hash::Hash;
use std::path::Path;

use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::{RunProvenance, SchemaVersion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::coefficients::Coefficient;
use crate::experiments::{CircuitInput, ObservableInput, Subexperiments};
use crate::serde::{from_json_slice, to_canonical_json_bytes};

fn io_error(code: &str, err: impl ToString, path: &Path) -> KnitError {
    KnitError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// SHA-256 of the canonical JSON encoding of `value`, as lowercase hex.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, KnitError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// Hash identifying the circuits and observables of one generation call.
pub fn input_hash<L: Serialize>(
    circuits: &CircuitInput<L>,
    observables: &ObservableInput<L>,
) -> Result<String, KnitError> {
    stable_hash_string(&(circuits, observables))
}

/// Versions of the crates that took part in generating a bundle.
pub fn tool_versions() -> BTreeMap<String, String> {
    BTreeMap::from([(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )])
}

/// Coefficients and subexperiments of one generation call, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "L: Serialize",
    deserialize = "L: Deserialize<'de> + Eq + Hash"
))]
pub struct ExperimentBundle<L = String> {
    /// Schema of the serialized bundle.
    pub schema_version: SchemaVersion,
    /// Inputs, seed and budget the bundle was generated from.
    pub provenance: RunProvenance,
    /// One coefficient per joint choice, in output order.
    pub coefficients: Vec<Coefficient>,
    /// Subexperiments aligned with `coefficients`.
    pub subexperiments: Subexperiments<L>,
}

impl<L> ExperimentBundle<L> {
    /// Packages a generation result under the current schema version.
    pub fn new(
        subexperiments: Subexperiments<L>,
        coefficients: Vec<Coefficient>,
        provenance: RunProvenance,
    ) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            provenance,
            coefficients,
            subexperiments,
        }
    }
}

impl<L> ExperimentBundle<L>
where
    L: Serialize + DeserializeOwned + Eq + Hash,
{
    /// Canonical JSON encoding with sorted object keys.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, KnitError> {
        to_canonical_json_bytes(self)
    }

    /// Decodes a bundle, rejecting an incompatible schema major version.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, KnitError> {
        let bundle: Self = from_json_slice(data)?;
        let expected = SchemaVersion::default();
        if bundle.schema_version.major != expected.major {
            return Err(KnitError::Serde(
                ErrorInfo::new("schema-version", "unsupported bundle schema version")
                    .with_context("found", bundle.schema_version.major)
                    .with_context("expected", expected.major),
            ));
        }
        Ok(bundle)
    }

    /// Hash of the coefficients and subexperiments, independent of provenance.
    pub fn content_hash(&self) -> Result<String, KnitError> {
        stable_hash_string(&(&self.coefficients, &self.subexperiments))
    }

    /// Writes the canonical JSON encoding to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), KnitError> {
        let bytes = self.to_canonical_json()?;
        fs::write(path, bytes).map_err(|err| io_error("bundle-write", err, path))
    }

    /// Reads a bundle written by [`Self::write_json`].
    pub fn read_json(path: &Path) -> Result<Self, KnitError> {
        let bytes = fs::read(path).map_err(|err| io_error("bundle-read", err, path))?;
        Self::from_json_slice(&bytes)
    }
}

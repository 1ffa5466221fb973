#![deny(missing_docs)]

//! Generation of quasi-probability circuit cutting experiments.
//!
//! A cut circuit carries [`knit_circuit::CutMarker`]s in place of the
//! interactions that were decomposed. This crate collects those markers,
//! samples joint choices of their basis alternatives, and produces one
//! resolved, measured subexperiment per (joint choice, measurement group,
//! partition) together with one signed coefficient per joint choice. The
//! coefficient list and the subexperiment lists share one deterministic
//! order: descending sample weight, ties in ascending choice order.

mod arena;
/// Bundles of generated experiments with provenance and hashing.
pub mod bundle;
/// Reconstruction coefficients.
pub mod coefficients;
/// Cut marker collection for unified and partitioned inputs.
pub mod collect;
/// Engine configuration.
pub mod config;
/// Input and output shapes and the cutting engine.
pub mod experiments;
/// Observable measurement append.
pub mod measurement;
/// Canonical JSON helpers.
pub mod serde;

pub use bundle::{input_hash, stable_hash_string, ExperimentBundle};
pub use coefficients::{compute_coefficients, kappa_total, sorted_samples, Coefficient};
pub use collect::{
    collect_partitioned, collect_unified, marker_cut_id, PartitionCuts, PartitionedCuts,
    UnifiedCuts,
};
pub use config::CuttingOptions;
pub use experiments::{
    generate_cutting_experiments, generate_distribution_cutting_experiments, CircuitInput,
    CuttingEngine, ObservableInput, Subexperiments,
};
pub use measurement::{
    append_measurement_circuit, append_measurement_circuit_in_place,
    OBSERVABLE_MEASUREMENT_REGISTER,
};
